//! Chart and TSV output of popularity histories.

use anyhow::{anyhow, Context, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::register_font;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::info;

use crate::history::LanguageHistory;
use crate::popularity::date_from_id;

/// Chart file linked from the static site
pub const CHART_FILE: &str = "language_popularity.png";
pub const SVG_CHART_FILE: &str = "language_popularity.svg";
pub const TSV_FILE: &str = "language_popularity.tsv";

const CHART_SIZE: (u32, u32) = (1200, 800);
const CHART_FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

static FONT_REGISTERED: OnceLock<bool> = OnceLock::new();

/// Paths written by [`export_all`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFiles {
    pub chart: PathBuf,
    pub svg: PathBuf,
    pub tsv: PathBuf,
}

/// Directory under the static root that receives the exported files
pub fn output_dir(static_root: &Path) -> PathBuf {
    static_root.join("ohloh")
}

/// Writes the TSV table: a `date` column followed by one column per language
///
/// A language with no record for a day gets `0` in that row.
pub fn write_tsv<W: io::Write>(
    writer: W,
    days: &[i64],
    languages: &[&LanguageHistory],
) -> Result<()> {
    let mut tsv = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(writer);

    let mut header = vec!["date".to_string()];
    header.extend(languages.iter().map(|l| l.name.clone()));
    tsv.write_record(&header)?;

    for day in days {
        let mut row = vec![day.to_string()];
        row.extend(
            languages
                .iter()
                .map(|l| l.on(*day).map_or_else(|| "0".to_string(), |p| p.to_string())),
        );
        tsv.write_record(&row)?;
    }

    tsv.flush()?;
    Ok(())
}

/// Makes the bundled sans-serif font available to every chart backend
fn register_chart_font() -> Result<()> {
    let registered = *FONT_REGISTERED
        .get_or_init(|| register_font("sans-serif", FontStyle::Normal, CHART_FONT).is_ok());
    if registered {
        Ok(())
    } else {
        Err(anyhow!("Bundled chart font could not be loaded"))
    }
}

/// Renders the chart as a PNG image
pub fn render_png(path: &Path, days: &[i64], languages: &[&LanguageHistory]) -> Result<()> {
    register_chart_font()?;
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    draw_chart(&root, days, languages)?;
    root.present()?;
    Ok(())
}

/// Renders the chart as an SVG document
pub fn render_svg(path: &Path, days: &[i64], languages: &[&LanguageHistory]) -> Result<()> {
    register_chart_font()?;
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    draw_chart(&root, days, languages)?;
    root.present()?;
    Ok(())
}

/// Draws one line per language across all snapshot days
fn draw_chart<DB>(
    root: &DrawingArea<DB, Shift>,
    days: &[i64],
    languages: &[&LanguageHistory],
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let x_max = days.len().saturating_sub(1).max(1) as i32;
    let mut chart = ChartBuilder::on(root)
        .caption("Language popularity", ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(50)
        .build_cartesian_2d(0i32..x_max, 0f64..110f64)?;

    let day_label = |idx: &i32| {
        usize::try_from(*idx)
            .ok()
            .and_then(|i| days.get(i))
            .map(|day| match date_from_id(*day) {
                Some(date) => date.format("%Y-%m-%d").to_string(),
                None => day.to_string(),
            })
            .unwrap_or_default()
    };
    chart
        .configure_mesh()
        .x_labels(days.len().clamp(2, 12))
        .x_label_formatter(&day_label)
        .y_desc("popularity")
        .draw()?;

    for (idx, language) in languages.iter().enumerate() {
        let color = Palette99::pick(idx).to_rgba();
        let points: Vec<(i32, f64)> = language
            .records
            .iter()
            .filter_map(|(day, popularity)| {
                days.iter()
                    .position(|d| d == day)
                    .map(|x| (x as i32, *popularity))
            })
            .collect();

        chart
            .draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))?
            .label(language.name.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        chart.draw_series(
            points
                .into_iter()
                .map(|point| Circle::new(point, 3, color.filled())),
        )?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    Ok(())
}

/// Writes the PNG and SVG charts and the TSV table into `<static_root>/ohloh/`
///
/// # Returns
/// * `Ok(ExportedFiles)` - Paths of the written files
/// * `Err` - If the directory or any file cannot be written
pub fn export_all(
    static_root: &Path,
    days: &[i64],
    languages: &[&LanguageHistory],
) -> Result<ExportedFiles> {
    let dir = output_dir(static_root);
    fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let chart = dir.join(CHART_FILE);
    info!("Saving chart to {}", chart.display());
    render_png(&chart, days, languages)?;

    let svg = dir.join(SVG_CHART_FILE);
    info!("Saving chart to {}", svg.display());
    render_svg(&svg, days, languages)?;

    let tsv = dir.join(TSV_FILE);
    info!("Generating TSV {}", tsv.display());
    let file = fs::File::create(&tsv)
        .with_context(|| format!("Failed to create {}", tsv.display()))?;
    write_tsv(file, days, languages)?;

    Ok(ExportedFiles { chart, svg, tsv })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(name: &str, records: &[(i64, f64)]) -> LanguageHistory {
        LanguageHistory {
            name: name.to_string(),
            records: records.to_vec(),
        }
    }

    #[test]
    fn test_tsv_layout() {
        let java = history("Java", &[(20131101, 100.0), (20131102, 100.0)]);
        let lisp = history("Lisp", &[(20131102, 12.5)]);
        let mut out = Vec::new();
        write_tsv(&mut out, &[20131101, 20131102], &[&java, &lisp]).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "date\tJava\tLisp\n20131101\t100\t0\n20131102\t100\t12.5\n"
        );
    }

    #[test]
    fn test_export_all_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let java = history("Java", &[(20131101, 100.0), (20131102, 98.0)]);
        let c_lang = history("C", &[(20131101, 71.0), (20131102, 74.5)]);

        let files = export_all(dir.path(), &[20131101, 20131102], &[&java, &c_lang]).unwrap();

        let ohloh = dir.path().join("ohloh");
        assert_eq!(files.chart, ohloh.join("language_popularity.png"));
        let png = fs::read(&files.chart).unwrap();
        assert!(png.starts_with(b"\x89PNG"));

        assert_eq!(files.svg, ohloh.join(SVG_CHART_FILE));
        let svg = fs::read_to_string(&files.svg).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Java"));

        let table = fs::read_to_string(&files.tsv).unwrap();
        assert!(table.starts_with("date\tJava\tC\n"));
        assert_eq!(table.lines().count(), 3);
    }
}
