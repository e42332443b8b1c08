use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::info;

use crate::codegen::{self, DrawModel, IndexWidth};
use crate::config::{ConvertConfig, ReportFormat};
use crate::error::Result;
use crate::ingestion;
use crate::layout::{AttributeGroup, AttributePresence, GroupSlot, Layout};
use crate::output::{self, OutputPaths};
use crate::packer;
use crate::types::PlyMesh;

/// Layout facts and counts for one conversion, as reported by `--dry-run`.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionPlan {
    pub object: String,
    pub vertices: usize,
    pub faces: usize,
    pub indices: usize,
    pub index_width: IndexWidth,
    pub stride: usize,
    pub binary_size: usize,
    pub groups: Vec<GroupSlot>,
}

impl ConversionPlan {
    fn new(model: &DrawModel<'_>, faces: usize) -> Self {
        Self {
            object: model.object_name.to_string(),
            vertices: model.vertex_count,
            faces,
            indices: model.index_count(),
            index_width: model.index_width,
            stride: model.layout.stride(),
            binary_size: model.vertex_count * model.layout.stride(),
            groups: model.layout.slots().to_vec(),
        }
    }
}

/// Summary of a completed conversion.
#[derive(Debug)]
pub struct ConversionResult {
    pub plan: ConversionPlan,
    /// Written artifacts; `None` on a dry run.
    pub outputs: Option<OutputPaths>,
    pub duration: Duration,
}

/// Pipeline orchestrator: ingest, plan, pack, generate.
pub struct Pipeline;

impl Pipeline {
    /// Run the full conversion.
    ///
    /// Every validation happens before the first file is written; a failure
    /// while packing discards the temporary binary without committing it.
    pub fn run(config: &ConvertConfig) -> Result<ConversionResult> {
        let start = Instant::now();

        info!(input = %config.input.display(), "Starting conversion");

        let mesh = ingestion::ingest(&config.input)?;

        let presence = AttributePresence::detect(mesh.vertices.names());
        print_summary(&mesh, &presence);

        let layout = Layout::plan(mesh.vertices.names(), config.presence_rule)?;
        info!(
            stride = layout.stride(),
            groups = ?layout.present_groups().collect::<Vec<_>>(),
            "Planned vertex layout"
        );

        let model = DrawModel::new(&mesh, &layout)?;
        let plan = ConversionPlan::new(&model, mesh.face_count());

        if config.dry_run {
            info!("--dry-run: reporting plan without writing output");
            print_plan(&plan, config.report)?;
            return Ok(ConversionResult {
                plan,
                outputs: None,
                duration: start.elapsed(),
            });
        }

        let paths = OutputPaths::new(
            &config.binary_dir,
            &config.source_dir,
            &config.header_dir,
            &mesh.name,
        );

        println!("Packing binary model {} ...", paths.binary.display());
        output::write_atomic(&paths.binary, |w| {
            packer::pack_into(&layout, &mesh.vertices, w)
        })?;

        println!("Generating C file {} ...", paths.source.display());
        output::write_bytes_atomic(&paths.source, codegen::render_source(&model).as_bytes())?;

        println!("Generating H file {} ...", paths.header.display());
        output::write_bytes_atomic(&paths.header, codegen::render_header(&model).as_bytes())?;

        let duration = start.elapsed();
        info!(
            bytes = plan.binary_size,
            elapsed = ?duration,
            "Conversion complete"
        );

        Ok(ConversionResult {
            plan,
            outputs: Some(paths),
            duration,
        })
    }
}

/// Print object counts and the five presence flags.
fn print_summary(mesh: &PlyMesh, presence: &AttributePresence) {
    println!(
        "Name:{} Vertices:{} Faces:{}",
        mesh.name,
        mesh.vertex_count(),
        mesh.index_count()
    );
    println!(
        "HasVtx:{} HasNorm:{} HasUv:{}",
        presence.contains(AttributeGroup::Position),
        presence.contains(AttributeGroup::Normal),
        presence.contains(AttributeGroup::TexCoord)
    );
    println!(
        "HasColor:{} HasColorAlpha:{}",
        presence.contains(AttributeGroup::Color),
        presence.contains(AttributeGroup::ColorAlpha)
    );
}

/// Print the dry-run plan in the requested format.
fn print_plan(plan: &ConversionPlan, format: ReportFormat) -> Result<()> {
    match format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(plan)?),
        ReportFormat::Text => {
            println!("=== Dry Run Summary ===");
            println!("  Object:      {}", plan.object);
            println!("  Vertices:    {}", plan.vertices);
            println!("  Faces:       {}", plan.faces);
            println!("  Indices:     {}", plan.indices);
            println!("  Index width: {:?}", plan.index_width);
            println!("  Stride:      {} bytes", plan.stride);
            println!("  Binary size: {} bytes", plan.binary_size);
            for slot in plan.groups.iter().filter(|s| s.present) {
                println!(
                    "  {:<11} offset {:>2}, {} bytes",
                    slot.group.to_string(),
                    slot.offset,
                    slot.size
                );
            }
        }
    }
    Ok(())
}
