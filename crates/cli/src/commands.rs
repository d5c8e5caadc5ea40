//! Subcommand implementations

use crate::RenderArgs;
use anyhow::{Context, Result};
use pdf_core::{FontFamilyBuilder, PdfDocument, PdfError};
use report::templates::{self, TEMPLATE_NAMES};
use report::{
    parse_report, prepare, FileImageSource, LayoutConfig, RenderedReport, ReportError,
    ReportRenderer,
};
use std::fs;
use std::path::Path;
use std::time::Instant;
use store::{BlobStore, FsBlobStore, JsonFileRepository, ReportRecord, Repository, StoreError};

/// Family name TrueType fonts from the command line are registered under
const EMBEDDED_FAMILY: &str = "report";

/// One-line message for the terminal; the log gets the full chain
pub fn user_message(err: &anyhow::Error) -> &'static str {
    if let Some(e) = err.downcast_ref::<ReportError>() {
        return e.user_message();
    }
    if err.downcast_ref::<StoreError>().is_some() {
        return "The report could not be archived.";
    }
    if err.downcast_ref::<PdfError>().is_some() {
        return "PDF generation failed.";
    }
    if err.downcast_ref::<std::io::Error>().is_some() {
        return "A file could not be read or written.";
    }
    "PDF generation failed."
}

fn load_config(path: Option<&Path>) -> Result<LayoutConfig> {
    match path {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading layout config {}", path.display()))?;
            Ok(LayoutConfig::from_json(&json)?)
        }
        None => Ok(LayoutConfig::default()),
    }
}

fn load_fonts(args: &RenderArgs) -> Result<Option<FontFamilyBuilder>> {
    let Some(regular) = &args.font_regular else {
        return Ok(None);
    };

    let data = fs::read(regular).with_context(|| format!("reading font {}", regular.display()))?;
    let mut builder = FontFamilyBuilder::new().regular(data);
    if let Some(bold) = &args.font_bold {
        let data = fs::read(bold).with_context(|| format!("reading font {}", bold.display()))?;
        builder = builder.bold(data);
    }
    Ok(Some(builder))
}

/// `avoreport render`
pub fn render(args: &RenderArgs) -> Result<()> {
    let started = Instant::now();

    let json = fs::read_to_string(&args.input)
        .with_context(|| format!("reading report {}", args.input.display()))?;
    let report = prepare(parse_report(&json)?)?;

    let mut config = load_config(args.config.as_deref())?;
    let fonts = load_fonts(args)?;
    if fonts.is_some() {
        config.font_family = EMBEDDED_FAMILY.to_string();
    }

    let images_dir = match &args.images_dir {
        Some(dir) => dir.clone(),
        None => args
            .input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };
    let renderer = ReportRenderer::new(config)?.with_images(FileImageSource::new(images_dir));

    if args.dry_run {
        let (summary, _) = renderer.dry_run(report)?;
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let template = report.template.clone();
    let lot = report.header.get("lotNumber").trim().to_string();

    let mut doc = PdfDocument::new(renderer.page_size(&report));
    if let Some(builder) = fonts {
        doc.register_font_family(EMBEDDED_FAMILY, builder)?;
    }
    let rendered = renderer.render_document(report, doc)?;

    let path = match &args.output {
        Some(path) => path.clone(),
        None => args.out_dir.join(&rendered.file_name),
    };
    write_output(&path, &rendered.bytes)?;
    log::info!(
        "Wrote {} ({} pages) in {:.2?}",
        path.display(),
        rendered.summary.pages,
        started.elapsed()
    );

    if let Some(dir) = &args.archive_dir {
        let lot = (!lot.is_empty()).then_some(lot);
        let record = archive(dir, &rendered, template, lot, args.user.clone())?;
        log::info!("Archived as {} at {}", record.id, record.url);
    }

    println!("{}", path.display());
    Ok(())
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Store the PDF under `<dir>/blobs` and record it in `<dir>/reports.json`
fn archive(
    dir: &Path,
    rendered: &RenderedReport,
    template: String,
    lot_number: Option<String>,
    created_by: Option<String>,
) -> Result<ReportRecord> {
    let mut blobs = FsBlobStore::new(dir.join("blobs"));
    let url = blobs.put(
        &format!("reports/{}", rendered.file_name),
        &rendered.bytes,
        "application/pdf",
    )?;

    let now = chrono::Utc::now();
    let stem = rendered.file_name.trim_end_matches(".pdf");
    let record = ReportRecord {
        id: format!("{stem}-{}", now.format("%Y%m%dT%H%M%S")),
        template,
        file_name: rendered.file_name.clone(),
        lot_number,
        pages: rendered.summary.pages,
        url,
        created_by,
        created_at: now.to_rfc3339(),
    };

    let mut index = JsonFileRepository::<ReportRecord>::open(dir)?;
    if index.get(&record.id)?.is_some() {
        index.update(record.clone())?;
    } else {
        index.create(record.clone())?;
    }
    Ok(record)
}

/// `avoreport templates`
pub fn templates() -> Result<()> {
    for name in TEMPLATE_NAMES {
        let Some(template) = templates::builtin(name) else {
            continue;
        };
        println!("{name}: {} ({:?})", template.title, template.orientation);
        for section in &template.sections {
            let fields: Vec<&str> = section.columns.iter().map(|c| c.field.as_str()).collect();
            match section.slots {
                Some(slots) => println!(
                    "  {}: {} [{} slots] {}",
                    section.key,
                    section.name,
                    slots,
                    fields.join(", ")
                ),
                None => println!("  {}: {} {}", section.key, section.name, fields.join(", ")),
            }
        }
    }
    Ok(())
}
