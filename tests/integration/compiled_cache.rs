//! Compiled template caching: memory, on-disk artifacts, freshness, purging.

use anyhow::Result;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use stitch::templating::Templates;
use stitch::test_utils::fixtures::{SITE, SITE_RENDERED};
use stitch::test_utils::{TemplateTreeBuilder, init_test_logging};

use crate::common::stash;

const SITE_COMPILED: &str = "<html><head><title>${title}</title></head>\n<body>\n<h1>${title}</h1>\n<footer>${year}</footer>\n</body></html>";

#[tokio::test]
async fn test_compile_is_idempotent() -> Result<()> {
    init_test_logging(None);
    let tree = TemplateTreeBuilder::new()?.with_files(SITE).build()?;
    let templates = tree.templates().await?;

    let first = templates.compile("view").await?;
    assert_eq!(&*first, SITE_COMPILED);

    // The second call must not look at the source again
    tree.write("view.htm", "edited")?;
    let second = templates.compile("view").await?;
    assert_eq!(first, second);

    let (hits, misses) = templates.cache_stats();
    assert_eq!((hits, misses), (1, 1));
    Ok(())
}

#[tokio::test]
async fn test_artifact_written_next_to_source() -> Result<()> {
    let tree = TemplateTreeBuilder::new()?.with_files(SITE).build()?;
    let templates = tree.templates().await?;

    let mut out = Vec::new();
    templates.execute(&mut out, "view", &mut stash(&[("title", "Hello"), ("year", "2024")])).await?;
    assert_eq!(String::from_utf8(out)?, SITE_RENDERED);

    // execute joins the background write before returning
    assert_eq!(tree.read("view.htmc")?, SITE_COMPILED);
    assert!(!tree.exists("partials/_footer.htmc"));
    assert!(!tree.exists("layouts/main.htmc"));

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(tree.join("view.htmc"))?.permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
    Ok(())
}

#[tokio::test]
async fn test_artifact_outlives_instance() -> Result<()> {
    let tree = TemplateTreeBuilder::new()?.with_files(SITE).build()?;

    let first = tree.templates().await?;
    first.compile("view").await?;
    first.wait_for_writes().await?;
    drop(first);

    // Artifacts do not expire: a new instance serves the old text
    tree.write("view.htm", "<p>rewritten</p>")?;
    let second = tree.templates().await?;
    assert_eq!(&*second.compile("view").await?, SITE_COMPILED);
    Ok(())
}

#[tokio::test]
async fn test_verify_freshness_recompiles_stale_artifact() -> Result<()> {
    let tree = TemplateTreeBuilder::new()?.with_files(SITE).build()?;
    tree.write("view.htmc", "stale compiled text")?;
    let old = SystemTime::now() - Duration::from_secs(3600);
    std::fs::File::options().write(true).open(tree.join("view.htmc"))?.set_modified(old)?;

    let templates = Templates::new(tree.config().verify_freshness(true)).await?;
    assert_eq!(&*templates.compile("view").await?, SITE_COMPILED);
    templates.wait_for_writes().await?;
    assert_eq!(tree.read("view.htmc")?, SITE_COMPILED);
    Ok(())
}

#[tokio::test]
async fn test_disabled_cache_recompiles_and_writes_nothing() -> Result<()> {
    let tree = TemplateTreeBuilder::new()?
        .with_file("view.htm", "${include part}")
        .with_file("part.htm", "one")
        .build()?;
    let templates = Templates::new(tree.config().cache_compiled(false)).await?;

    assert_eq!(&*templates.compile("view").await?, "one");

    tree.write("part.htm", "two")?;
    templates.evict("part");
    assert_eq!(&*templates.compile("view").await?, "two");

    templates.wait_for_writes().await?;
    assert!(!tree.exists("view.htmc"));
    assert_eq!(templates.cache_stats(), (0, 0));
    Ok(())
}

#[tokio::test]
async fn test_disabled_cache_ignores_existing_artifact() -> Result<()> {
    let tree = TemplateTreeBuilder::new()?
        .with_file("view.htm", "fresh")
        .with_file("view.htmc", "old artifact")
        .build()?;
    let templates = Templates::new(tree.config().cache_compiled(false)).await?;
    assert_eq!(&*templates.compile("view").await?, "fresh");
    Ok(())
}

#[tokio::test]
async fn test_custom_compiled_suffix() -> Result<()> {
    let tree = TemplateTreeBuilder::new()?.with_file("view.htm", "v").build()?;
    let templates = Templates::new(tree.config().compiled_suffix(".compiled")).await?;
    templates.compile("view").await?;
    templates.wait_for_writes().await?;
    assert!(tree.exists("view.htm.compiled"));
    assert!(!tree.exists("view.htmc"));
    Ok(())
}

#[tokio::test]
async fn test_purge_compiled() -> Result<()> {
    let tree = TemplateTreeBuilder::new()?.with_files(SITE).build()?;
    tree.write("partials/_old.htmc", "leftover")?;
    let templates = tree.templates().await?;

    templates.compile("view").await?;
    assert_eq!(templates.purge_compiled().await?, 2);
    assert!(!tree.exists("view.htmc"));
    assert!(!tree.exists("partials/_old.htmc"));
    assert!(tree.exists("view.htm"));

    // Purging also cleared memory, so edits are picked up
    tree.write("view.htm", "new view")?;
    assert_eq!(&*templates.compile("view").await?, "new view");
    Ok(())
}

#[tokio::test]
async fn test_evict_reloads_from_artifact() -> Result<()> {
    let tree = TemplateTreeBuilder::new()?.with_file("view.htm", "v1").build()?;
    let templates = tree.templates().await?;
    templates.compile("view").await?;
    templates.wait_for_writes().await?;

    tree.write("view.htmc", "patched artifact")?;
    assert!(templates.evict("view"));
    assert_eq!(&*templates.compile("view").await?, "patched artifact");
    Ok(())
}

#[tokio::test]
async fn test_shared_instance_serves_concurrent_requests() -> Result<()> {
    let tree = TemplateTreeBuilder::new()?.with_files(SITE).build()?;
    let templates = Arc::new(tree.templates().await?);

    let mut tasks = Vec::new();
    for i in 0..8 {
        let templates = Arc::clone(&templates);
        tasks.push(tokio::spawn(async move {
            let year = format!("{}", 2000 + i);
            let mut data = stash(&[("title", "Hello"), ("year", year.as_str())]);
            let mut out = Vec::new();
            templates.execute(&mut out, "view", &mut data).await.map(|_| (year, out))
        }));
    }

    for task in tasks {
        let (year, out) = task.await??;
        let expected = SITE_RENDERED.replace("2024", &year);
        assert_eq!(String::from_utf8(out)?, expected);
    }

    templates.wait_for_writes().await?;
    assert_eq!(tree.read("view.htmc")?, SITE_COMPILED);
    Ok(())
}
