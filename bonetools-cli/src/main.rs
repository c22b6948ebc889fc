use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use bonetools_core::config::{self, ToolConfig};
use bonetools_core::rig::presets::PresetStore;
use bonetools_core::rig::{chain, Skeleton, SkeletonSnapshot};
use bonetools_core::weights::{transfer, MeshSnapshot, WeightFile};
use bonetools_core::{preview, BoneToolsError, VERSION};

#[derive(Parser, Debug)]
#[command(name = "bonetools", version = VERSION, about = "Bone naming and skin weight transfer tools")]
struct Cli {
    /// YAML settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rename selected bone chains as Prefix_main_chain_bone
    RenameChain {
        #[arg(long)]
        skeleton: PathBuf,
        #[arg(long)]
        prefix: Option<String>,
        /// Write the renamed skeleton here (default: overwrite input)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List naming presets
    Presets {
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Convert bone names from one naming preset to another
    ConvertNames {
        #[arg(long)]
        skeleton: PathBuf,
        #[arg(long)]
        source: String,
        #[arg(long)]
        target: String,
        #[arg(long)]
        presets: Option<PathBuf>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Export mesh weights to the JSON exchange format
    ExportWeights {
        #[arg(long)]
        mesh: PathBuf,
        #[arg(long)]
        out: PathBuf,
        #[arg(long)]
        skip_unweighted: bool,
    },
    /// Transfer weights from an exchange file onto a mesh by nearest vertex
    ImportWeights {
        #[arg(long)]
        mesh: PathBuf,
        #[arg(long)]
        weights: PathBuf,
        /// 0 = unlimited
        #[arg(long)]
        max_distance: Option<f32>,
        #[arg(long)]
        selected_only: bool,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Summarize a weight exchange file
    InspectWeights { path: PathBuf },
    /// Compute rainbow preview colors for a mesh
    PreviewColors {
        #[arg(long)]
        mesh: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn load_config(path: Option<&Path>) -> Result<ToolConfig> {
    match path {
        Some(p) => config::load_from_path(p),
        None => Ok(ToolConfig::default()),
    }
}

fn load_skeleton(path: &Path) -> Result<Skeleton> {
    let snap = SkeletonSnapshot::load_from_path(path).with_context(|| format!("read skeleton {}", path.display()))?;
    Ok(Skeleton::from_snapshot(&snap)?)
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let mut cfg = load_config(cli.config.as_deref())?;
    log::debug!("config: {cfg:?}");

    match cli.cmd {
        Command::RenameChain { skeleton, prefix, out } => {
            let mut sk = load_skeleton(&skeleton)?;
            let prefix = prefix.unwrap_or(cfg.chain.prefix);
            let assignments = chain::rename(&sk, &sk.selection(), &prefix)?;
            let old_names: Vec<String> =
                assignments.iter().map(|a| sk.bone(a.bone).map(|b| b.name.clone()).unwrap_or_default()).collect();
            sk.apply_names(&assignments)?;
            for (old, a) in old_names.iter().zip(&assignments) {
                println!("  {} -> {}", old, a.name);
            }
            let out = out.unwrap_or(skeleton);
            sk.to_snapshot().save_to_path(&out)?;
            println!("Renamed {} bones, wrote {}", assignments.len(), out.display());
        }
        Command::Presets { file } => {
            let store = match file {
                Some(path) => PresetStore::load_from_path(&path)
                    .with_context(|| format!("load presets {}", path.display()))?,
                None => cfg.preset_store()?,
            };
            for (key, name, description) in store.items() {
                println!("{:<12} {:<12} {}", key, name, description);
            }
        }
        Command::ConvertNames { skeleton, source, target, presets, out } => {
            if presets.is_some() {
                cfg.presets.path = presets;
            }
            let store = cfg.preset_store()?;
            let mapping = match store.mapping(&source, &target) {
                Err(BoneToolsError::SamePreset(key)) => {
                    log::warn!("source and target preset are both '{key}'; nothing to convert");
                    println!("Source and target are the same");
                    return Ok(());
                }
                other => other?,
            };
            let mut sk = load_skeleton(&skeleton)?;
            let renamed = sk.apply_mapping(&mapping)?;
            if renamed == 0 {
                println!("No matching bones found");
                return Ok(());
            }
            let out = out.unwrap_or(skeleton);
            sk.to_snapshot().save_to_path(&out)?;
            println!("Renamed {} bones ({} -> {}), wrote {}", renamed, source, target, out.display());
        }
        Command::ExportWeights { mesh, out, skip_unweighted } => {
            let snapshot = MeshSnapshot::load_from_path(&mesh).with_context(|| format!("read mesh {}", mesh.display()))?;
            let mut options = cfg.export;
            options.skip_unweighted |= skip_unweighted;
            let file = snapshot.export(options);
            file.save_to_path(&out)?;
            println!(
                "Exported {} vertices ({} groups) to {}",
                file.vertices.len(),
                file.vertex_groups.len(),
                out.display()
            );
        }
        Command::ImportWeights { mesh, weights, max_distance, selected_only, out } => {
            let mut snapshot =
                MeshSnapshot::load_from_path(&mesh).with_context(|| format!("read mesh {}", mesh.display()))?;
            let file = WeightFile::load_from_path(&weights)
                .with_context(|| format!("read weights {}", weights.display()))?;
            let mut options = cfg.transfer;
            if let Some(d) = max_distance {
                options.max_distance = d;
            }
            options.selected_only |= selected_only;

            let result = transfer(&file, &snapshot.targets(), &options)?;
            let report = snapshot.apply_transfer(&result)?;
            let out = out.unwrap_or(mesh);
            snapshot.save_to_path(&out)?;
            if !report.created_groups.is_empty() {
                println!("Created groups: {}", report.created_groups.join(", "));
            }
            println!(
                "Updated {} vertices ({} without a match), wrote {}",
                report.updated_vertices,
                result.skipped,
                out.display()
            );
        }
        Command::InspectWeights { path } => {
            let file = WeightFile::load_from_path(&path).with_context(|| format!("read weights {}", path.display()))?;
            println!("Weight file: {}", path.display());
            println!("  vertices: {} ({} weighted)", file.vertices.len(), file.weighted_vertex_count());
            println!("  groups: {}", file.vertex_groups.len());
            for g in &file.vertex_groups {
                let used = file.vertices.iter().filter(|v| v.weights.iter().any(|w| &w.bone == g)).count();
                println!("    {:<24} {} vertices", g, used);
            }
        }
        Command::PreviewColors { mesh, out } => {
            let snapshot = MeshSnapshot::load_from_path(&mesh).with_context(|| format!("read mesh {}", mesh.display()))?;
            let colors = preview::preview_colors(&snapshot);
            match out {
                Some(path) => {
                    std::fs::write(&path, serde_json::to_string_pretty(&colors)?)?;
                    println!("Wrote {} vertex colors to {}", colors.len(), path.display());
                }
                None => {
                    for (i, c) in colors.iter().enumerate() {
                        println!("[{}] {:.3} {:.3} {:.3}", i, c[0], c[1], c[2]);
                    }
                }
            }
        }
    }
    Ok(())
}
