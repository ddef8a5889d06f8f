use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use gallery_manifest::{ManifestFile, ManifestSchema};
use gallery_sync::{list_all_keys, ListPage, ObjectLister, Reconciler, SyncError};

/// Serves pre-built pages; page `n` is requested with token `p<n>`.
struct PagedLister {
    pages: Vec<Vec<&'static str>>,
    fail_on_page: Option<usize>,
    requests: Mutex<Vec<(String, Option<String>)>>,
}

impl PagedLister {
    fn new(pages: Vec<Vec<&'static str>>) -> Self {
        Self {
            pages,
            fail_on_page: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn failing_on(mut self, page: usize) -> Self {
        self.fail_on_page = Some(page);
        self
    }

    fn requests(&self) -> Vec<(String, Option<String>)> {
        self.requests.lock().expect("requests mutex poisoned").clone()
    }
}

#[async_trait]
impl ObjectLister for PagedLister {
    async fn list_objects(&self, bucket: &str, token: Option<&str>) -> Result<ListPage> {
        self.requests
            .lock()
            .expect("requests mutex poisoned")
            .push((bucket.to_string(), token.map(str::to_string)));

        let idx = match token {
            None => 0,
            Some(t) => t
                .strip_prefix('p')
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| anyhow::anyhow!("unknown token {t}"))?,
        };
        if self.fail_on_page == Some(idx) {
            anyhow::bail!("simulated provider failure on page {idx}");
        }
        let keys = self
            .pages
            .get(idx)
            .ok_or_else(|| anyhow::anyhow!("no page {idx}"))?
            .iter()
            .map(|k| k.to_string())
            .collect();
        let more = idx + 1 < self.pages.len();
        Ok(ListPage {
            keys,
            is_truncated: more,
            next_continuation_token: more.then(|| format!("p{}", idx + 1)),
        })
    }
}

fn temp_dir(test_name: &str) -> Result<PathBuf> {
    let mut root = std::env::temp_dir();
    root.push(format!(
        "gallery-sync-{test_name}-{}-{}",
        std::process::id(),
        gallery_observe::time::unix_time_ms()
    ));
    std::fs::create_dir_all(&root)?;
    Ok(root)
}

#[tokio::test]
async fn empty_manifest_gains_one_row_per_valid_key() -> Result<()> {
    let root = temp_dir("e2e")?;
    let path = root.join("gallery.csv");
    let lister = PagedLister::new(vec![vec![
        "Venue A/Ceremony/a.jpg",
        "Venue A/Ceremony/a.jpg",
        "Venue A/bad.jpg",
        "Venue B/Reception/b.png",
    ]]);

    let report = Reconciler::new(lister, "photos", ManifestFile::new(&path))
        .run()
        .await?;

    assert_eq!(report.added_rows, 2);
    assert_eq!(report.skipped_keys, 1);
    assert!(report.written);
    assert!(report.summary().starts_with("Added 2 new row(s)"));
    assert_eq!(
        std::fs::read_to_string(&path)?,
        "venue,moment,file,tag,published,sort\n\
Venue A,Ceremony,a.jpg,,false,\n\
Venue B,Reception,b.png,,false,\n"
    );
    Ok(())
}

#[tokio::test]
async fn second_run_without_changes_writes_nothing() -> Result<()> {
    let root = temp_dir("idempotent")?;
    let path = root.join("gallery.csv");
    let pages = vec![
        vec!["Venue A/Ceremony/a.jpg", "Venue A/Ceremony/b.jpg"],
        vec!["Venue B/Reception/c.gif"],
    ];

    let first = Reconciler::new(PagedLister::new(pages.clone()), "photos", ManifestFile::new(&path))
        .run()
        .await?;
    assert_eq!(first.added_rows, 3);
    let after_first = std::fs::read(&path)?;

    let second = Reconciler::new(PagedLister::new(pages), "photos", ManifestFile::new(&path))
        .run()
        .await?;
    assert_eq!(second.added_rows, 0);
    assert!(!second.written);
    assert_eq!(second.summary(), "No new images found (3 existing row(s))");
    assert_eq!(std::fs::read(&path)?, after_first);
    Ok(())
}

#[tokio::test]
async fn keys_with_quotes_or_line_breaks_do_not_break_reruns() -> Result<()> {
    let root = temp_dir("unstorable-keys")?;
    let path = root.join("gallery.csv");
    let pages = vec![vec![
        "The \"Barn\"/Ceremony/a.jpg",
        "Venue A/First\nLook/b.jpg",
        "Venue A/Ceremony/c.jpg",
    ]];

    let first = Reconciler::new(PagedLister::new(pages.clone()), "photos", ManifestFile::new(&path))
        .run()
        .await?;
    assert_eq!(first.added_rows, 1);
    assert_eq!(first.skipped_keys, 2);
    let after_first = std::fs::read(&path)?;
    assert_eq!(
        String::from_utf8_lossy(&after_first),
        "venue,moment,file,tag,published,sort\nVenue A,Ceremony,c.jpg,,false,\n"
    );

    let second = Reconciler::new(PagedLister::new(pages), "photos", ManifestFile::new(&path))
        .run()
        .await?;
    assert_eq!(second.added_rows, 0);
    assert!(!second.written);
    assert_eq!(std::fs::read(&path)?, after_first);
    Ok(())
}

#[tokio::test]
async fn existing_rows_are_kept_as_is_and_new_rows_are_sorted_in() -> Result<()> {
    let root = temp_dir("existing")?;
    let path = root.join("gallery.csv");
    std::fs::write(
        &path,
        "venue,category,filename,tags\n\
Venue A,Ceremony,Z.JPG,bride\n\
Venue A,Ceremony,m.jpg,\n",
    )?;
    let lister = PagedLister::new(vec![vec![
        "venue a/ceremony/z.jpg",
        "Venue A/Ceremony/a.jpg",
        "Venue A/Ceremony/notes.txt",
    ]]);

    let report = Reconciler::new(lister, "photos", ManifestFile::new(&path))
        .run()
        .await?;
    assert_eq!(report.existing_rows, 2);
    assert_eq!(report.added_rows, 1);

    // Legacy rows without a published column are public; the discovered row is not.
    assert_eq!(
        std::fs::read_to_string(&path)?,
        "venue,moment,file,tag,published,sort\n\
Venue A,Ceremony,Z.JPG,bride,true,\n\
Venue A,Ceremony,a.jpg,,false,\n\
Venue A,Ceremony,m.jpg,,true,\n"
    );
    Ok(())
}

#[tokio::test]
async fn manual_sort_values_order_within_group() -> Result<()> {
    let root = temp_dir("sort")?;
    let path = root.join("gallery.csv");
    std::fs::write(
        &path,
        "venue,moment,file,tag,published,sort\n\
V,M,two.jpg,,true,2\n\
V,M,blank.jpg,,true,\n\
V,M,one.jpg,,true,1\n",
    )?;
    let lister = PagedLister::new(vec![vec!["V/M/new.jpg"]]);

    Reconciler::new(lister, "photos", ManifestFile::new(&path))
        .run()
        .await?;

    let files: Vec<String> = ManifestFile::new(&path)
        .load()?
        .into_iter()
        .map(|r| r.file)
        .collect();
    assert_eq!(files, vec!["one.jpg", "two.jpg", "blank.jpg", "new.jpg"]);
    Ok(())
}

#[tokio::test]
async fn listing_follows_continuation_tokens_in_order() -> Result<()> {
    let lister = PagedLister::new(vec![vec!["a/b/1.jpg"], vec![], vec!["a/b/2.jpg", "a/b/3.jpg"]]);
    let keys = list_all_keys(&lister, "photos").await?;
    assert_eq!(keys, vec!["a/b/1.jpg", "a/b/2.jpg", "a/b/3.jpg"]);
    assert_eq!(
        lister.requests(),
        vec![
            ("photos".to_string(), None),
            ("photos".to_string(), Some("p1".to_string())),
            ("photos".to_string(), Some("p2".to_string())),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn listing_failure_leaves_manifest_untouched() -> Result<()> {
    let root = temp_dir("listing-failure")?;
    let path = root.join("gallery.csv");
    let original = "venue,moment,file,tag,published,sort\nVenue A,Ceremony,a.jpg,,true,\n";
    std::fs::write(&path, original)?;

    let lister = PagedLister::new(vec![vec!["Venue B/Reception/b.jpg"], vec!["Venue C/Party/c.jpg"]])
        .failing_on(1);

    let err = Reconciler::new(lister, "photos", ManifestFile::new(&path))
        .run()
        .await
        .unwrap_err();
    match err {
        SyncError::Listing(e) => assert!(format!("{e:#}").contains("page 1")),
        other => panic!("expected Listing error, got {other:?}"),
    }
    assert_eq!(std::fs::read_to_string(&path)?, original);
    Ok(())
}

#[tokio::test]
async fn dry_run_reports_without_writing() -> Result<()> {
    let root = temp_dir("dry-run")?;
    let path = root.join("gallery.csv");
    let lister = PagedLister::new(vec![vec!["Venue A/Ceremony/a.jpg"]]);

    let report = Reconciler::new(lister, "photos", ManifestFile::new(&path))
        .dry_run(true)
        .run()
        .await?;
    assert_eq!(report.added_rows, 1);
    assert!(!report.written);
    assert!(!path.exists());
    Ok(())
}

#[tokio::test]
async fn unusable_header_is_treated_as_empty_manifest() -> Result<()> {
    let root = temp_dir("malformed")?;
    let path = root.join("gallery.csv");
    std::fs::write(&path, "venue,tags\nVenue A,x\n")?;
    let lister = PagedLister::new(vec![vec!["Venue A/Ceremony/a.jpg"]]);

    let report = Reconciler::new(lister, "photos", ManifestFile::new(&path))
        .run()
        .await?;
    assert_eq!(report.existing_rows, 0);
    assert_eq!(report.added_rows, 1);
    assert_eq!(
        ManifestFile::new(&path).read_text()?.as_deref(),
        Some("venue,moment,file,tag,published,sort\nVenue A,Ceremony,a.jpg,,false,\n")
    );
    Ok(())
}

#[test]
fn catalog_schema_is_what_reconcile_writes() {
    assert_eq!(
        ManifestSchema::Catalog.header(),
        &["venue", "moment", "file", "tag", "published", "sort"]
    );
}
