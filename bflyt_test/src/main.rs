use std::{
    path::Path,
    sync::atomic::{AtomicUsize, Ordering},
};

use bflyt_lib::{layout::layout_elements, Bflyt, Validation};
use clap::Parser;
use log::LevelFilter;
use rayon::prelude::*;

#[derive(Parser)]
#[command(author, version, about)]
#[command(propagate_version = true)]
struct Cli {
    /// A .bflyt file or a folder to search recursively for .bflyt files.
    input: String,

    /// Reject files without the FLYT signature or with a file size
    /// that does not match the header.
    #[arg(long)]
    strict: bool,

    /// Print the decoded file as JSON. Only applies to single files.
    #[arg(long)]
    json: bool,

    /// Print the layout elements as JSON. Only applies to single files.
    #[arg(long)]
    elements: bool,

    /// The maximum level for log messages.
    #[arg(long, default_value_t = LevelFilter::Warn)]
    log_level: LevelFilter,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    simple_logger::SimpleLogger::new()
        .with_level(cli.log_level)
        .init()?;

    let validation = if cli.strict {
        Validation::Strict
    } else {
        Validation::Lenient
    };

    let start = std::time::Instant::now();

    let input = Path::new(&cli.input);
    if input.is_file() {
        let bflyt = Bflyt::from_file_with(input, validation)?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&bflyt)?);
        }
        if cli.elements {
            println!("{}", serde_json::to_string_pretty(&layout_elements(&bflyt))?);
        }
        if !cli.json && !cli.elements {
            print_summary(&bflyt);
        }
    } else if input.is_dir() {
        check_folder(input, validation)?;
    } else {
        anyhow::bail!("{input:?} is not a file or folder");
    }

    println!("Finished in {:?}", start.elapsed());
    Ok(())
}

fn print_summary(bflyt: &Bflyt) {
    println!(
        "version: 0x{:08X}, sections: {}",
        bflyt.header.version,
        bflyt.sections.len()
    );
    for section in &bflyt.sections {
        match section.content.pane() {
            Some(pane) => println!(
                "{}: {} {:?} {}x{}",
                section.tag, pane.name, pane.position, pane.width, pane.height
            ),
            None => println!("{}: {} bytes", section.tag, section.size),
        }
    }
    for name in bflyt.texture_names() {
        println!("texture: {name}");
    }
}

fn check_folder(root: &Path, validation: Validation) -> anyhow::Result<()> {
    let count = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);

    globwalk::GlobWalkerBuilder::from_patterns(root, &["*.bflyt"])
        .build()?
        .par_bridge()
        .for_each(|entry| {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    println!("Error searching {root:?}: {e}");
                    return;
                }
            };
            let path = entry.path();
            count.fetch_add(1, Ordering::Relaxed);

            if let Err(e) = Bflyt::from_file_with(path, validation) {
                failed.fetch_add(1, Ordering::Relaxed);
                println!("Error reading {path:?}: {e}");
            }
        });

    let count = count.into_inner();
    let failed = failed.into_inner();
    println!("Read {} of {count} files", count - failed);
    Ok(())
}
