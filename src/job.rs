//! The daily popularity job: fetch, score, tier, store, plot.

use anyhow::{anyhow, Result};
use tracing::{info, warn};

use crate::catalog::{create_http_client, get_top_languages, LanguageCount};
use crate::clustering::{find_clusters, Agglomerative, Clustering, Linkage, DEFAULT_TIER_LABELS};
use crate::config::Config;
use crate::db::Database;
use crate::export::{export_all, ExportedFiles};
use crate::history::{build_histories, rank_by_latest, select_for_plot};
use crate::mail::send_email;
use crate::popularity::{normalize, to_items, today_id, Snapshot};
use crate::report::{format_ranking, format_tiers};

/// Outcome of recording one day
#[derive(Debug, Clone)]
pub struct DayReport {
    pub snapshot: Snapshot,
    pub ranking: String,
    /// `None` when no language passed the storage threshold
    pub clustering: Option<Clustering>,
}

impl DayReport {
    /// Ranking followed by the tiers, as printed and mailed
    pub fn text(&self) -> String {
        let mut text = self.ranking.clone();
        if let Some(clustering) = &self.clustering {
            text.push('\n');
            text.push_str(&format_tiers(clustering));
        }
        text
    }
}

/// Fetches today's counts and stores them, unless today is already stored
///
/// # Arguments
/// * `config` - Catalog, thresholds and mail settings
/// * `db` - Snapshot store
/// * `notify` - Whether to mail the report to the configured recipients
///
/// # Returns
/// * `Ok(Some(DayReport))` - If a new snapshot was stored
/// * `Ok(None)` - If today's snapshot already existed
/// * `Err` - If fetching, clustering or storing failed
pub async fn query_today_data(
    config: &Config,
    db: &Database,
    notify: bool,
) -> Result<Option<DayReport>> {
    let day_id = today_id();
    if db.has_snapshot(day_id).await? {
        info!("Language popularity data already stored in the DB");
        return Ok(None);
    }

    config.require_api_key()?;
    let client = create_http_client()?;
    let languages = get_top_languages(&client, &config.catalog).await?;

    let report = record_day(db, day_id, &languages, config.db_threshold).await?;
    println!("{}", report.text());

    if notify {
        notify_report(config, &report).await;
    }

    Ok(Some(report))
}

/// Normalizes one day's counts, groups them into tiers and stores the snapshot
pub async fn record_day(
    db: &Database,
    day_id: i64,
    languages: &[LanguageCount],
    threshold: f64,
) -> Result<DayReport> {
    let scores = normalize(languages, threshold);
    info!("{} of {} languages above {:.2}", scores.len(), languages.len(), threshold);

    let clustering = if scores.is_empty() {
        warn!("No language passed the storage threshold, skipping tiers");
        None
    } else {
        Some(find_clusters(&to_items(&scores), &DEFAULT_TIER_LABELS)?)
    };

    let snapshot = Snapshot::new(day_id, &scores);
    info!("Store data in DB: {}", day_id);
    db.insert_snapshot(&snapshot).await?;

    Ok(DayReport {
        snapshot,
        ranking: format_ranking(&scores),
        clustering,
    })
}

async fn notify_report(config: &Config, report: &DayReport) {
    let settings = match &config.mail {
        Some(settings) if !config.notify.is_empty() => settings,
        _ => {
            warn!("Notification requested but EMAIL_HOST, EMAIL_USER or NOTIFY_EMAILS is not set");
            return;
        }
    };

    let subject = format!("Language popularity {}", report.snapshot.day_id);
    send_email(settings, &subject, &report.text(), &config.notify).await;
}

/// Renders the charts and TSV from every stored snapshot
///
/// # Returns
/// * `Ok(Some(ExportedFiles))` - If files were written
/// * `Ok(None)` - If no snapshot is stored yet
/// * `Err` - If loading or writing failed
pub async fn plot_data(config: &Config, db: &Database) -> Result<Option<ExportedFiles>> {
    let snapshots = db.load_all_snapshots().await?;
    if snapshots.is_empty() {
        warn!("No snapshots stored, nothing to plot");
        return Ok(None);
    }

    let days: Vec<i64> = snapshots.iter().map(|s| s.day_id).collect();
    let mut histories = build_histories(&snapshots);
    rank_by_latest(&mut histories);
    let selected = select_for_plot(&histories, config.plot_threshold);
    info!("Plotting {} of {} languages over {} days", selected.len(), histories.len(), days.len());

    export_all(&config.static_dir, &days, &selected).map(Some)
}

/// Groups a stored snapshot into tiers, the latest one unless a day is given
pub async fn show_tiers(db: &Database, day_id: Option<i64>, linkage: Linkage) -> Result<Clustering> {
    let day_id = match day_id {
        Some(day_id) => day_id,
        None => db
            .latest_day_id()
            .await?
            .ok_or_else(|| anyhow!("No snapshots stored"))?,
    };
    let snapshot = db
        .load_snapshot(day_id)
        .await?
        .ok_or_else(|| anyhow!("No snapshot stored for {}", day_id))?;

    Ok(Agglomerative::new(linkage).find_clusters(&snapshot.items(), &DEFAULT_TIER_LABELS)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(&str, u64)]) -> Vec<LanguageCount> {
        pairs
            .iter()
            .map(|(name, count)| LanguageCount {
                name: name.to_string(),
                count: *count,
            })
            .collect()
    }

    fn catalog_day() -> Vec<LanguageCount> {
        counts(&[
            ("Java", 4000),
            ("C++", 3600),
            ("Python", 3000),
            ("C", 2800),
            ("PHP", 1800),
            ("Perl", 1000),
            ("Ruby", 900),
            ("Lisp", 240),
            ("Haskell", 120),
            ("Erlang", 60),
            ("Modula", 1),
        ])
    }

    #[tokio::test]
    async fn test_record_day() {
        let db = Database::in_memory().await.unwrap();
        let report = record_day(&db, 20131107, &catalog_day(), 0.45).await.unwrap();

        // Modula scores 0.025 and is dropped
        assert_eq!(report.snapshot.scores.len(), 10);
        assert!(!report.snapshot.scores.contains_key("Modula"));
        assert!((report.snapshot.scores["Java"] - 100.0).abs() < 1e-9);

        let clustering = report.clustering.as_ref().unwrap();
        assert_eq!(clustering.clusters.len(), 4);
        assert_eq!(clustering.tier_of("Java").unwrap().label, "Ubiquitous");
        assert_eq!(clustering.tier_of("Erlang").unwrap().label, "Niche");
        assert!(report.text().contains("Popularity Clusters:"));

        assert!(db.has_snapshot(20131107).await.unwrap());
        assert!(record_day(&db, 20131107, &catalog_day(), 0.45).await.is_err());
    }

    #[tokio::test]
    async fn test_record_day_without_scores() {
        let db = Database::in_memory().await.unwrap();
        let report = record_day(&db, 20131107, &[], 0.45).await.unwrap();
        assert!(report.clustering.is_none());
        assert!(db.has_snapshot(20131107).await.unwrap());
    }

    #[tokio::test]
    async fn test_tiers_and_plot_from_store() {
        let db = Database::in_memory().await.unwrap();
        assert!(show_tiers(&db, None, Linkage::Average).await.is_err());

        record_day(&db, 20131107, &catalog_day(), 0.45).await.unwrap();
        record_day(&db, 20131108, &catalog_day(), 0.45).await.unwrap();

        let tiers = show_tiers(&db, None, Linkage::Complete).await.unwrap();
        assert_eq!(tiers.clusters[0].label, "Ubiquitous");
        assert!(show_tiers(&db, Some(20131109), Linkage::Average).await.is_err());

        let dir = tempfile::tempdir().unwrap();
        let static_dir = dir.path().to_string_lossy().into_owned();
        let config = Config::from_lookup(|key| match key {
            "WWW_STATIC" => Some(static_dir.clone()),
            _ => None,
        })
        .unwrap();

        let files = plot_data(&config, &db).await.unwrap().unwrap();
        assert!(files.chart.exists());
        assert!(files.svg.exists());
        let table = std::fs::read_to_string(files.tsv).unwrap();
        let header = table.lines().next().unwrap();
        // Lisp (6.0), Haskell and Erlang never reach the plot threshold
        assert_eq!(header, "date\tJava\tC++\tPython\tC\tPHP\tPerl\tRuby");
        assert_eq!(table.lines().count(), 3);
    }
}
