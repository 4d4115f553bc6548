//! Rendering with stash values, producers and partial templates.

use anyhow::Result;
use std::io::{self, Write};
use std::sync::Arc;

use stitch::templating::{Stash, Templates, Value};
use stitch::test_utils::TemplateTreeBuilder;

use crate::common::stash;

#[tokio::test]
async fn test_every_occurrence_replaced_and_unknown_dropped() -> Result<()> {
    let tree = TemplateTreeBuilder::new()?
        .with_file("view.htm", "<title>${title}</title><h1>${title}</h1>${subtitle}")
        .build()?;
    let templates = tree.templates().await?;

    let mut out = Vec::new();
    templates.execute(&mut out, "view", &mut stash(&[("title", "Hello")])).await?;
    assert_eq!(out, b"<title>Hello</title><h1>Hello</h1>");
    Ok(())
}

#[tokio::test]
async fn test_bytes_and_producer_values() -> Result<()> {
    let tree = TemplateTreeBuilder::new()?
        .with_file("view.htm", "[${raw}] [${items}] [${count}]")
        .build()?;
    let templates = tree.templates().await?;

    let mut data = Stash::new();
    data.insert("raw", b"\xe2\x9c\x93".as_slice());
    data.insert(
        "items",
        Value::producer(|w: &mut dyn Write, _tag, stash| {
            let mut written = 0;
            for item in ["a", "b", "c"] {
                written += w.write(format!("<li>{item}</li>").as_bytes())?;
            }
            stash.insert("count", "3");
            Ok(written)
        }),
    );

    let mut out = Vec::new();
    let n = templates.execute(&mut out, "view", &mut data).await?;
    let rendered = String::from_utf8(out)?;
    assert_eq!(rendered, "[✓] [<li>a</li><li>b</li><li>c</li>] [3]");
    assert_eq!(n, rendered.len() as u64);
    Ok(())
}

#[tokio::test]
async fn test_producer_receives_tag_name() -> Result<()> {
    let tree = TemplateTreeBuilder::new()?.with_file("view.htm", "${a}-${b}").build()?;
    let templates = tree.templates().await?;

    let echo = Value::producer(|w: &mut dyn Write, tag, _| w.write(tag.to_uppercase().as_bytes()));
    let mut data = Stash::new();
    data.insert("a", echo.clone());
    data.insert("b", echo);

    let mut out = Vec::new();
    templates.execute(&mut out, "view", &mut data).await?;
    assert_eq!(out, b"A-B");
    Ok(())
}

#[tokio::test]
async fn test_producer_error_is_render_error() -> Result<()> {
    let tree = TemplateTreeBuilder::new()?.with_file("view.htm", "${broken}").build()?;
    let templates = tree.templates().await?;

    let mut data = Stash::new();
    data.insert(
        "broken",
        Value::producer(|_: &mut dyn Write, _, _| Err(std::io::Error::other("database unavailable"))),
    );

    let mut out = Vec::new();
    let err = templates.execute(&mut out, "view", &mut data).await.unwrap_err();
    assert!(matches!(err, stitch::StitchError::Render { .. }));
    assert!(!err.is_fatal());
    Ok(())
}

#[tokio::test]
async fn test_partial_rendering_helpers() -> Result<()> {
    let tree = TemplateTreeBuilder::new()?.build()?;
    let templates = tree.templates().await?;

    let mut data: Stash = stash(&[("prev", "previous")]);
    data.merge([("next", "following")]);

    let pager = r#"<div class="pager">${prev}${next}${last}</div>"#;
    assert_eq!(
        templates.render_partial(pager, &mut data)?,
        r#"<div class="pager">previousfollowing</div>"#
    );
    assert_eq!(
        templates.render_partial_std(pager, &mut data)?,
        r#"<div class="pager">previousfollowing${last}</div>"#
    );

    let mut out = Vec::new();
    templates.render_partial_to("${prev} ${unknown}", &mut out, &mut data)?;
    assert_eq!(out, b"previous ${unknown}");
    Ok(())
}

const BOOKS: &[(&str, &str)] = &[
    ("Лечителката и рунтавата ѝ… котка", "Контадин Кременски"),
    ("На пост", "Николай Фенерски"),
];

/// Renders every entry of [`BOOKS`] through the `partials/_book_item` partial.
fn other_books(templates: Arc<Templates>) -> Value {
    Value::producer(move |w: &mut dyn Write, _tag, _stash| {
        let item = templates.load_file_blocking("partials/_book_item").map_err(io::Error::other)?;
        let mut written = 0;
        for &(title, author) in BOOKS {
            let mut book = stash(&[("book_title", title), ("book_author", author)]);
            let row = templates.render_partial_std(&item, &mut book).map_err(io::Error::other)?;
            w.write_all(row.as_bytes())?;
            written += row.len();
        }
        Ok(written)
    })
}

#[tokio::test]
async fn test_producer_renders_partial_per_row() -> Result<()> {
    let tree = TemplateTreeBuilder::new()?
        .with_file("book.htm", "${wrapper layout}\n<div class=\"book\">${book_title}</div>\n<ul>${other_books}</ul>\n")
        .with_file("layout.htm", "<html lang=\"${lang}\">${content}</html>\n")
        .with_file("partials/_book_item.htm", "<li>${book_title} - ${book_author}${book_isbn}</li>\n")
        .build()?;
    let templates = Arc::new(tree.templates().await?);

    let mut data = stash(&[("lang", "bg"), ("book_title", "Историософия")]);
    data.insert("other_books", other_books(Arc::clone(&templates)));

    let mut out = Vec::new();
    templates.execute(&mut out, "book", &mut data).await?;
    assert_eq!(
        String::from_utf8(out)?,
        "<html lang=\"bg\"><div class=\"book\">Историософия</div>\n<ul>\
         <li>Лечителката и рунтавата ѝ… котка - Контадин Кременски${book_isbn}</li>\n\
         <li>На пост - Николай Фенерски${book_isbn}</li>\n</ul></html>"
    );
    Ok(())
}

#[tokio::test]
async fn test_producer_compiles_composed_partial() -> Result<()> {
    let tree = TemplateTreeBuilder::new()?
        .with_file("page.htm", "<main>${sidebar}</main>")
        .with_file("partials/_sidebar.htm", "${wrapper partials/_box}\n${include partials/_links}\n")
        .with_file("partials/_box.htm", "<aside>${content}</aside>\n")
        .with_file("partials/_links.htm", "<a>${home}</a>\n")
        .build()?;
    let templates = Arc::new(tree.templates().await?);

    let partials = Arc::clone(&templates);
    let mut data = stash(&[("home", "/")]);
    data.insert(
        "sidebar",
        Value::producer(move |w: &mut dyn Write, _tag, stash| {
            let sidebar = partials.compile_blocking("partials/_sidebar").map_err(io::Error::other)?;
            let html = partials.render_partial(&sidebar, stash).map_err(io::Error::other)?;
            w.write_all(html.as_bytes())?;
            Ok(html.len())
        }),
    );

    let mut out = Vec::new();
    templates.execute(&mut out, "page", &mut data).await?;
    assert_eq!(out, b"<main><aside><a>/</a></aside></main>");

    // The partial's artifact write was joined by execute
    assert_eq!(tree.read("partials/_sidebar.htmc")?, "<aside><a>${home}</a></aside>");
    Ok(())
}
