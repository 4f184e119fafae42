use std::error::Error;
use std::path::PathBuf;

use clap::Parser;

use roentgen::siddon::{crossed_voxels, trace};
use roentgen::utils::parse_triplet;
use roentgen::{Point, Volume};

fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();

    let (dx, dy, dz) = args.size;
    let (nx, ny, nz) = args.nvoxels;
    let dims = [nx, ny, nz];
    let spacing = [dx / nx as f32, dy / ny as f32, dz / nz as f32];

    let volume = if let Some(file) = &args.input_file {
        Volume::from_raw_file(file, dims, spacing)?
    } else {
        Volume::ones(dims, spacing)?
    };

    let source = Point::new(args.source.0, args.source.1, args.source.2);
    let target = Point::new(args.target.0, args.target.1, args.target.2);

    let hits = crossed_voxels(source, target, &volume);
    if hits.is_empty() {
        println!("ray misses the volume");
        return Ok(());
    }

    println!("{:>5} {:>5} {:>5}  {:>12}", "ix", "iy", "iz", "length");
    for ([ix, iy, iz], length) in &hits {
        println!("{ix:>5} {iy:>5} {iz:>5}  {length:>12.6}");
    }

    let total: f32 = hits.iter().map(|(_, length)| length).sum();
    println!("chord length inside volume: {total:.6}");
    println!("line integral:              {:.6}", trace(source, target, &volume));

    Ok(())
}

#[derive(Parser, Debug, Clone)]
#[command(name = "visray", about = "Show the voxels crossed by a single ray")]
pub struct Cli {
    /// Volume full extent in world units
    #[arg(short, long, value_parser = parse_triplet::<f32>, default_value = "300,300,300")]
    size: (f32, f32, f32),

    /// Volume size in number of voxels
    #[arg(short, long, value_parser = parse_triplet::<usize>, default_value = "151,151,151")]
    nvoxels: (usize, usize, usize),

    /// Ray source point
    #[arg(long, value_parser = parse_triplet::<f32>, default_value = "50,170,60")]
    source: (f32, f32, f32),

    /// Ray target point
    #[arg(long, value_parser = parse_triplet::<f32>, default_value = "250,210,160")]
    target: (f32, f32, f32),

    /// Raw f32 density file; uniform density 1 when absent
    #[arg(short = 'f', long)]
    input_file: Option<PathBuf>,
}
