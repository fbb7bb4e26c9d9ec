//! Pagination driver and document output.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::card::{CardOutcome, render_card};
use crate::errors::{CardError, Result};
use crate::layout::{LayoutChoice, LayoutName};
use crate::routine::{Routine, RoutineInput};
use crate::sheet::{SheetPlan, start_sheet};
use crate::surface::{DocumentInfo, PdfSurface, RasterSurface, Surface};

/// Encoded document kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Pdf,
    Png,
}

/// Knobs that affect encoding but never layout.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub format: OutputFormat,
    /// Raster resolution; ignored for PDF.
    pub dpi: u32,
    /// Stamped into the PDF info dictionary when present.
    pub created: Option<DateTime<Utc>>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Pdf,
            dpi: 150,
            created: None,
        }
    }
}

/// Result record for a finished generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub layout: LayoutName,
    pub cards_per_page: u32,
    pub pages_generated: u32,
    pub cards_generated: u32,
}

/// Per-card item accounting plus a digest of the encoded output.
///
/// Every card renders the same routine, so the counts hold for each card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub items_per_card: usize,
    pub items_drawn: usize,
    pub items_truncated: usize,
    pub items_skipped: usize,
    pub sha256: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub summary: Summary,
    pub diagnostics: Diagnostics,
}

/// What [`paginate`] drew.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub summary: Summary,
    pub per_card: CardOutcome,
}

/// A routine ready to print: card size resolved, quantity validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub routine: Routine,
    pub layout: LayoutName,
    pub quantity: u32,
}

impl Job {
    pub fn new(routine: Routine, layout: LayoutName, quantity: u32) -> Result<Self> {
        if quantity == 0 {
            return Err(CardError::ZeroQuantity);
        }
        Ok(Self {
            routine,
            layout,
            quantity,
        })
    }

    /// Build a job from decoded input, resolving `auto` from the raw item count.
    pub fn from_input(input: &RoutineInput, choice: LayoutChoice) -> Result<Self> {
        let layout = choice.resolve(input.item_count());
        Self::new(input.to_routine(), layout, input.quantity)
    }
}

/// Draw `quantity` cards onto `surface`, sheet by sheet.
///
/// The surface must be fresh: its open page becomes the first sheet.
pub fn paginate<S: Surface>(
    surface: &mut S,
    routine: &Routine,
    layout: LayoutName,
    quantity: u32,
) -> Result<Pagination> {
    if quantity == 0 {
        return Err(CardError::ZeroQuantity);
    }
    let plan = SheetPlan::new(layout.spec(), quantity);
    let mut cards = 0;
    let mut per_card = CardOutcome::default();

    for page in 0..plan.pages() {
        start_sheet(surface, plan.spec(), page);
        for placement in plan.placements_on(page) {
            per_card = render_card(surface, placement.frame, routine, routine.version());
            cards += 1;
        }
        debug!(page, cards, "finished sheet");
    }

    Ok(Pagination {
        summary: Summary {
            layout,
            cards_per_page: plan.cards_per_page(),
            pages_generated: plan.pages(),
            cards_generated: cards,
        },
        per_card,
    })
}

enum Encoded {
    Pdf(Vec<u8>),
    Png(Vec<Vec<u8>>),
}

impl Encoded {
    fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        match self {
            Encoded::Pdf(bytes) => hasher.update(bytes),
            Encoded::Png(pages) => pages.iter().for_each(|page| hasher.update(page)),
        }
        format!("{:x}", hasher.finalize())
    }
}

fn render(job: &Job, options: &RenderOptions) -> Result<(Encoded, Generation)> {
    let (encoded, pagination) = match options.format {
        OutputFormat::Pdf => {
            let mut surface = PdfSurface::new(DocumentInfo {
                title: Some(job.routine.name().to_string()),
                created: options.created,
            });
            let pagination = paginate(&mut surface, &job.routine, job.layout, job.quantity)?;
            (Encoded::Pdf(surface.finish()), pagination)
        }
        OutputFormat::Png => {
            let mut surface = RasterSurface::new(options.dpi);
            let pagination = paginate(&mut surface, &job.routine, job.layout, job.quantity)?;
            (Encoded::Png(surface.finish()?), pagination)
        }
    };

    let diagnostics = Diagnostics {
        items_per_card: job.routine.items().len(),
        items_drawn: pagination.per_card.drawn,
        items_truncated: pagination.per_card.truncated,
        items_skipped: pagination.per_card.skipped,
        sha256: encoded.digest(),
    };
    info!(
        layout = %pagination.summary.layout,
        pages = pagination.summary.pages_generated,
        cards = pagination.summary.cards_generated,
        "generated cards"
    );
    Ok((
        encoded,
        Generation {
            summary: pagination.summary,
            diagnostics,
        },
    ))
}

/// Render the job and return the encoded document.
///
/// Only PDF has a single-stream form; PNG output needs a destination.
pub fn generate_bytes(job: &Job, options: &RenderOptions) -> Result<Vec<u8>> {
    if options.format == OutputFormat::Png {
        return Err(CardError::MissingDestination);
    }
    match render(job, options)? {
        (Encoded::Pdf(bytes), _) => Ok(bytes),
        (Encoded::Png(_), _) => Err(CardError::MissingDestination),
    }
}

/// Render the job and write it to `destination`.
///
/// Nothing is written until rendering has succeeded. Every file is staged
/// next to its target before any is moved into place, and if a later move
/// fails the pages already placed are removed again. PNG jobs write
/// `page_0001.png`... into `destination` as a directory, unless the job fits
/// one sheet and `destination` ends in `.png`.
pub fn generate_to_path(
    job: &Job,
    options: &RenderOptions,
    destination: &Path,
) -> Result<Generation> {
    let (encoded, generation) = render(job, options)?;
    match encoded {
        Encoded::Pdf(bytes) => write_atomic(&[(destination.to_path_buf(), bytes.as_slice())])?,
        Encoded::Png(pages) => {
            let targets = png_targets(destination, pages.len());
            let files: Vec<(PathBuf, &[u8])> = targets
                .into_iter()
                .zip(pages.iter().map(Vec::as_slice))
                .collect();
            write_atomic(&files)?;
        }
    }
    Ok(generation)
}

fn png_targets(destination: &Path, pages: usize) -> Vec<PathBuf> {
    let single_file = destination
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("png"))
        .unwrap_or(false);
    if single_file && pages == 1 {
        return vec![destination.to_path_buf()];
    }
    (1..=pages)
        .map(|n| destination.join(format!("page_{n:04}.png")))
        .collect()
}

fn stage(path: &Path, bytes: &[u8]) -> Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|err| CardError::io(dir, err))?;
    let mut staged = NamedTempFile::new_in(dir).map_err(|err| CardError::io(dir, err))?;
    staged
        .write_all(bytes)
        .and_then(|_| staged.as_file().sync_all())
        .map_err(|err| CardError::io(path, err))?;
    Ok(staged)
}

/// Write every file or none of them.
fn write_atomic(files: &[(PathBuf, &[u8])]) -> Result<()> {
    let staged = files
        .iter()
        .map(|(path, bytes)| stage(path, bytes).map(|file| (path, file)))
        .collect::<Result<Vec<_>>>()?;

    let mut placed: Vec<&Path> = Vec::with_capacity(staged.len());
    for (path, file) in staged {
        if let Err(err) = file.persist(path) {
            for done in &placed {
                if let Err(cleanup) = fs::remove_file(done) {
                    warn!(path = %done.display(), error = %cleanup, "could not remove partial output");
                }
            }
            return Err(CardError::io(path, err.error));
        }
        placed.push(path);
    }
    for (path, bytes) in files {
        debug!(path = %path.display(), bytes = bytes.len(), "wrote output");
    }
    Ok(())
}
