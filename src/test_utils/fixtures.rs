//! Reusable template sets.

use std::io::Write;

use crate::templating::Value;

/// A page wrapped into a layout, with an included footer.
pub const SITE: &[(&str, &str)] = &[
    ("view.htm", "${wrapper layouts/main}\n<h1>${title}</h1>\n${include partials/_footer}\n"),
    ("layouts/main.htm", "<html><head><title>${title}</title></head>\n<body>\n${content}\n</body></html>\n"),
    ("partials/_footer.htm", "<footer>${year}</footer>\n"),
];

/// [`SITE`] rendered with `title = "Hello"` and `year = "2024"`.
pub const SITE_RENDERED: &str = "<html><head><title>Hello</title></head>\n<body>\n<h1>Hello</h1>\n<footer>2024</footer>\n</body></html>";

/// An include chain four levels deep.
///
/// `include.htm` includes `partials/_l1`, which includes `_l2`, which
/// includes `_l3`, which includes `_l4`. Compiling it needs an include limit
/// of at least 4. Every level prints `${level}`; see [`level_counter`].
pub const INCLUDE_CHAIN: &[(&str, &str)] = &[
    ("include.htm", "${level} ${include partials/_l1}\n"),
    ("partials/_l1.htm", "${level} ${include partials/_l2}\n"),
    ("partials/_l2.htm", "${level} ${include partials/_l3}\n"),
    ("partials/_l3.htm", "${level} ${include partials/_l4}\n"),
    ("partials/_l4.htm", "${last}\n"),
];

/// Producer that prints how many times it has run and records the count as
/// `last` in the stash.
///
/// Rendering [`INCLUDE_CHAIN`] with it bound to `level` yields `1 2 3 4 4`.
pub fn level_counter() -> Value {
    Value::producer(|w: &mut dyn Write, _tag, stash| {
        let level = stash
            .get_text("last")
            .and_then(|last| last.parse::<usize>().ok())
            .unwrap_or(0)
            + 1;
        let text = level.to_string();
        stash.insert("last", text.clone());
        w.write_all(text.as_bytes())?;
        Ok(text.len())
    })
}
