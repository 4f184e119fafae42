// ----------------------------------- CLI -----------------------------------
use clap::Parser;

use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "drr", about = "Render digitally reconstructed radiographs")]
pub struct Cli {
    /// TOML run configuration: volume, detector, poses
    #[arg(short, long)]
    pub config: PathBuf,

    /// Output file pattern; one raw f32 image per pose is written as
    /// `<pattern>_NNN.raw`
    #[arg(short, long, default_value = "out/drr/image")]
    pub out_files: String,

    /// Also write per-pixel pose gradients as `<pattern>_NNN.grad.raw`
    #[arg(short, long)]
    pub gradients: bool,

    /// Maximum number of rayon threads
    #[arg(short = 'j', long, default_value = "4")]
    pub num_threads: usize,
}

// --------------------------------------------------------------------------------

use std::error::Error;
use std::fs::create_dir_all;

use indicatif::{ProgressBar, ProgressStyle};

use roentgen::config::read_config_file;
use roentgen::utils::{group_digits, timing::Progress};
use roentgen::{Pose, Projector, Volume};

fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();

    rayon::ThreadPoolBuilder::new()
        .num_threads(args.num_threads)
        .build_global()?;

    let mut progress = Progress::new();

    progress.start("Reading config");
    let config = read_config_file(&args.config)?;
    progress.done();

    progress.start("Loading volume from disk");
    let volume = Volume::from_raw_file(
        &config.volume.path,
        config.volume.dims,
        config.volume.spacing,
    )?;
    progress.done();

    let detector = config.detector.build()?;
    let poses = config
        .poses
        .iter()
        .map(|row| Pose::from_params(row))
        .collect::<Result<Vec<_>, _>>()?;

    let projector = Projector::new(detector, volume);

    // If the directory where results will be written does not exist yet, make it
    if let Some(dir) = PathBuf::from(format!("{}_000.raw", args.out_files)).parent() {
        create_dir_all(dir)?;
    }

    let bar = ProgressBar::new(poses.len() as u64);
    bar.set_style(ProgressStyle::with_template(
        "{bar:40} {pos}/{len} poses  {elapsed_precise}",
    )?);

    let mut render_time = Progress::new();
    for (i, pose) in poses.iter().enumerate() {
        let batch = std::slice::from_ref(pose);
        if args.gradients {
            let (image, gradients) = projector.render_with_gradients(batch)?;
            image.write_to_raw_file(&PathBuf::from(format!("{}_{i:03}.raw", args.out_files)))?;
            roentgen::io::raw::write(
                gradients.iter().copied(),
                &PathBuf::from(format!("{}_{i:03}.grad.raw", args.out_files)),
            )?;
        } else {
            let image = projector.render(batch)?;
            image.write_to_raw_file(&PathBuf::from(format!("{}_{i:03}.raw", args.out_files)))?;
        }
        bar.inc(1);
    }
    bar.finish();
    render_time.done_with_message(&format!(
        "Rendered {} rays over {} poses",
        group_digits(projector.detector().n_pixels() * poses.len()),
        group_digits(poses.len()),
    ));

    Ok(())
}
