//! Tests of the `stitch` binary.

use anyhow::Result;
use predicates::prelude::*;

use stitch::test_utils::TemplateTreeBuilder;
use stitch::test_utils::fixtures::{INCLUDE_CHAIN, SITE, SITE_RENDERED};

use crate::common::stitch_cmd;

#[test]
fn test_render_to_stdout() -> Result<()> {
    let tree = TemplateTreeBuilder::new()?.with_files_in("templates", SITE).build()?;

    stitch_cmd(tree.path())
        .args(["render", "view", "--root", "templates", "--set", "title=Hello", "-s", "year=2024"])
        .assert()
        .success()
        .stdout(SITE_RENDERED);

    assert!(tree.exists("templates/view.htmc"));
    Ok(())
}

#[test]
fn test_render_to_file() -> Result<()> {
    let tree = TemplateTreeBuilder::new()?.with_files_in("templates", SITE).build()?;

    stitch_cmd(tree.path())
        .args(["render", "view", "-r", "templates", "--set", "title=Hello", "--set", "year=2024"])
        .args(["--output", "out.html", "--no-cache"])
        .assert()
        .success()
        .stdout("");

    assert_eq!(tree.read("out.html")?, SITE_RENDERED);
    assert!(!tree.exists("templates/view.htmc"));
    Ok(())
}

#[test]
fn test_failed_render_keeps_previous_output_file() -> Result<()> {
    let tree = TemplateTreeBuilder::new()?
        .with_files_in("templates", INCLUDE_CHAIN)
        .with_file("out.html", "previous good output")
        .build()?;

    stitch_cmd(tree.path())
        .args(["render", "include", "-r", "templates", "--output", "out.html"])
        .assert()
        .code(101);
    assert_eq!(tree.read("out.html")?, "previous good output");

    stitch_cmd(tree.path())
        .args(["render", "nosuchfile", "-r", "templates", "--output", "out.html"])
        .assert()
        .code(1);
    assert_eq!(tree.read("out.html")?, "previous good output");

    stitch_cmd(tree.path())
        .args(["render", "include", "-r", "templates", "--include-limit", "4", "--output", "out.html"])
        .args(["-s", "level=L", "-s", "last=end"])
        .assert()
        .success();
    assert_eq!(tree.read("out.html")?, "L L L L end");
    Ok(())
}

#[test]
fn test_compile_prints_flattened_text() -> Result<()> {
    let tree = TemplateTreeBuilder::new()?.with_files_in("templates", SITE).build()?;

    stitch_cmd(tree.path())
        .args(["compile", "view", "--root", "templates"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<h1>${title}</h1>\n<footer>${year}</footer>"));
    Ok(())
}

#[test]
fn test_config_file_is_discovered() -> Result<()> {
    let tree = TemplateTreeBuilder::new()?
        .with_file("site/view.htm", "<%wrapper layout%>\n<%who%>")
        .with_file("site/layout.htm", "Hello <%content%>!")
        .with_file(
            "stitch.toml",
            "roots = [\"site\"]\ncache_compiled = false\n\n[tags]\nopen = \"<%\"\nclose = \"%>\"\n",
        )
        .build()?;

    stitch_cmd(tree.path())
        .args(["render", "view", "--set", "who=world"])
        .assert()
        .success()
        .stdout("Hello world!");
    Ok(())
}

#[test]
fn test_explicit_config_file() -> Result<()> {
    let tree = TemplateTreeBuilder::new()?
        .with_file("site/view.htm", "${who}")
        .with_file("conf/custom.toml", "roots = [\"site\"]\n")
        .build()?;

    stitch_cmd(tree.path())
        .args(["--config", "conf/custom.toml", "render", "view", "--set", "who=me"])
        .assert()
        .success()
        .stdout("me");
    Ok(())
}

#[test]
fn test_include_limit_exits_with_fatal_status() -> Result<()> {
    let tree = TemplateTreeBuilder::new()?.with_files_in("templates", INCLUDE_CHAIN).build()?;

    stitch_cmd(tree.path())
        .args(["render", "include", "--root", "templates"])
        .assert()
        .code(101)
        .stdout("")
        .stderr(predicate::str::contains("fatal").and(predicate::str::contains("nested inclusions")));

    stitch_cmd(tree.path())
        .args(["compile", "include", "--root", "templates", "--include-limit", "4"])
        .assert()
        .success()
        .stdout("${level} ${level} ${level} ${level} ${last}\n");
    Ok(())
}

#[test]
fn test_missing_root_exits_with_error() -> Result<()> {
    let tree = TemplateTreeBuilder::new()?.build()?;

    stitch_cmd(tree.path())
        .args(["render", "view", "--root", "/no/such/stitch/root"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("/no/such/stitch/root"));
    Ok(())
}

#[test]
fn test_missing_template_exits_with_error() -> Result<()> {
    let tree = TemplateTreeBuilder::new()?.with_file("templates/view.htm", "x").build()?;

    stitch_cmd(tree.path())
        .args(["render", "nosuchfile", "--root", "templates"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("nosuchfile.htm"));
    Ok(())
}

#[test]
fn test_purge_reports_count() -> Result<()> {
    let tree = TemplateTreeBuilder::new()?
        .with_files_in("templates", SITE)
        .with_file("templates/view.htmc", "old")
        .with_file("templates/partials/_footer.htmc", "old")
        .build()?;

    stitch_cmd(tree.path())
        .args(["purge", "--root", "templates"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 2 compiled template(s)"));

    assert!(!tree.exists("templates/view.htmc"));
    assert!(tree.exists("templates/view.htm"));

    stitch_cmd(tree.path()).args(["purge", "--root", "templates", "--quiet"]).assert().success().stdout("");
    Ok(())
}

#[test]
fn test_help_lists_commands() {
    let tree = TemplateTreeBuilder::new().unwrap().build().unwrap();
    stitch_cmd(tree.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("render").and(predicate::str::contains("purge")));
}
