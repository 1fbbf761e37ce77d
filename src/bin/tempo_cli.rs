//! Manual test driver for the cadence engine
//!
//! Plays a preset for a number of cycles and prints each phase transition
//! with its offset from start, so cue spacing can be checked by ear and by
//! eye against the preset's frame counts.

use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};

use tempo_trainer::catalog::{self, GameMode};
use tempo_trainer::config::TrainerConfig;
use tempo_trainer::phase::Phase;
use tempo_trainer::trainer::TrainerHandle;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Long,
    Short,
}

impl From<ModeArg> for GameMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Long => GameMode::LongGame,
            ModeArg::Short => GameMode::ShortGame,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "tempo-cli", about = "Swing tempo cadence engine driver")]
struct Args {
    /// Game mode to train
    #[arg(long, value_enum, default_value = "long")]
    mode: ModeArg,

    /// Preset index within the mode (0 = fastest); defaults to the mode default
    #[arg(long)]
    preset: Option<usize>,

    /// Number of cadence cycles to play
    #[arg(long, default_value_t = 3)]
    cycles: u32,

    /// Optional JSON config file overriding timing and tone parameters
    #[arg(long)]
    config: Option<String>,

    /// List the preset catalog and exit
    #[arg(long)]
    list: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.list {
        for mode in [GameMode::LongGame, GameMode::ShortGame] {
            println!("{:?}:", mode);
            for (i, preset) in catalog::presets_for(mode).iter().enumerate() {
                let marker = if i == catalog::DEFAULT_PRESET_INDEX { "*" } else { " " };
                println!(
                    " {} [{}] {}/{} frames ({})",
                    marker, i, preset.backswing_frames, preset.downswing_frames, preset.ratio_label
                );
            }
        }
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => TrainerConfig::load_from_file(path),
        None => TrainerConfig::load(),
    };

    let mode = GameMode::from(args.mode);
    let handle = TrainerHandle::with_config(config);
    handle.select_mode(mode).context("failed to select mode")?;

    if let Some(index) = args.preset {
        let presets = catalog::presets_for(mode);
        if index >= presets.len() {
            bail!(
                "preset index {} out of range for {:?} (0..{})",
                index,
                mode,
                presets.len()
            );
        }
        handle
            .select_preset(presets[index])
            .context("failed to select preset")?;
    }

    let preset = handle
        .current_preset()
        .context("failed to read active preset")?;
    eprintln!(
        "[tempo-cli] {:?} {}/{} frames ({}), {} cycle(s)",
        mode, preset.backswing_frames, preset.downswing_frames, preset.ratio_label, args.cycles
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build runtime")?;

    runtime.block_on(async {
        let mut rx = handle.subscribe_phase();
        handle.start().context("failed to start cadence")?;
        let started = Instant::now();

        let mut completed = 0u32;
        while completed < args.cycles {
            match rx.recv().await {
                Ok(phase) => {
                    println!(
                        "{:>8.1} ms  {:?}",
                        started.elapsed().as_secs_f64() * 1000.0,
                        phase
                    );
                    if phase == Phase::Idle {
                        completed += 1;
                    }
                }
                Err(_) => break,
            }
        }

        handle.stop();
        Ok::<(), anyhow::Error>(())
    })?;

    eprintln!("[tempo-cli] done.");
    Ok(())
}
