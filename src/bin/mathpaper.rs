// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate clap;
extern crate mathpaper;
extern crate num_cpus;
extern crate tracing;
extern crate tracing_subscriber;

use clap::{App, Arg, ArgMatches};
use mathpaper::menu::Menu;
use mathpaper::{
    catalog, find, run_batch, DivergencePolicy, ImageSurface, PatternSpec, RenderConfig,
    RunReport, Signature,
};
use std::io;
use std::path::PathBuf;
use std::process;
use std::str::FromStr;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + PartialOrd>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const OUTPUT_DIR: &str = "output-dir";
const SIZE: &str = "size";
const SAMPLES: &str = "samples";
const ITERATIONS: &str = "iterations";
const STRIDE: &str = "stride";
const EPSILON: &str = "epsilon";
const DPI: &str = "dpi";
const SEED: &str = "seed";
const THREADS: &str = "threads";
const SIGNATURE: &str = "signature";
const SIGNATURE_TEXT: &str = "signature-text";
const FONT: &str = "font";
const SHOW: &str = "show";
const STRICT: &str = "strict";
const PATTERN: &str = "pattern";
const ALL: &str = "all";
const LIST: &str = "list";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();

    App::new("mathpaper")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Mathematical wallpaper generator")
        .arg(
            Arg::with_name(OUTPUT_DIR)
                .long(OUTPUT_DIR)
                .short("o")
                .takes_value(true)
                .default_value("wallpapers")
                .help("Directory receiving the rendered PNG files"),
        )
        .arg(
            Arg::with_name(SIZE)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("3840x2160")
                .validator(|s| match parse_pair::<u32>(&s, 'x') {
                    Some((w, h)) if w > 0 && h > 0 => Ok(()),
                    Some(_) => Err("Image dimensions must be positive".to_string()),
                    None => validate_pair::<u32>(&s, 'x', "Could not parse output image size"),
                })
                .help("Size of output images, WIDTHxHEIGHT"),
        )
        .arg(
            Arg::with_name(SAMPLES)
                .long(SAMPLES)
                .short("n")
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        usize::max_value(),
                        "Could not parse sample count",
                        "Sample count must be at least 1",
                    )
                })
                .help("Points recorded per attractor, map or curve"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        1_000_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 1000000",
                    )
                })
                .help("Iteration cap for escape-time fractals"),
        )
        .arg(
            Arg::with_name(STRIDE)
                .long(STRIDE)
                .takes_value(true)
                .default_value("2")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        64,
                        "Could not parse stride",
                        "Stride must be between 1 and 64",
                    )
                })
                .help("Escape-time fractals sample every Nth pixel and fill the block"),
        )
        .arg(
            Arg::with_name(EPSILON)
                .long(EPSILON)
                .takes_value(true)
                .default_value("1e-6")
                .validator(|s| {
                    validate_range(
                        &s,
                        std::f64::MIN_POSITIVE,
                        1.0,
                        "Could not parse epsilon",
                        "Epsilon must be positive and at most 1",
                    )
                })
                .help("Range below which a sequence axis counts as degenerate"),
        )
        .arg(
            Arg::with_name(DPI)
                .long(DPI)
                .takes_value(true)
                .default_value("1000")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        100_000,
                        "Could not parse dpi",
                        "Dpi must be between 1 and 100000",
                    )
                })
                .help("Resolution hint for saved images"),
        )
        .arg(
            Arg::with_name(SEED)
                .long(SEED)
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        0,
                        u64::max_value(),
                        "Could not parse seed",
                        "Seed out of range",
                    )
                })
                .help("Seed for randomized patterns; fresh entropy when absent"),
        )
        .arg(
            Arg::with_name(THREADS)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .default_value("1")
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of patterns rendered at once"),
        )
        .arg(
            Arg::with_name(SIGNATURE)
                .long(SIGNATURE)
                .help("Stamp the signature on every image"),
        )
        .arg(
            Arg::with_name(SIGNATURE_TEXT)
                .long(SIGNATURE_TEXT)
                .takes_value(true)
                .default_value("@aeronautyy")
                .help("Signature text"),
        )
        .arg(
            Arg::with_name(FONT)
                .long(FONT)
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .help("Font file for the signature, tried in order; may be repeated"),
        )
        .arg(
            Arg::with_name(SHOW)
                .long(SHOW)
                .help("Open each saved image in the system viewer"),
        )
        .arg(
            Arg::with_name(STRICT)
                .long(STRICT)
                .help("Fail a diverging sequence instead of keeping the points before it"),
        )
        .arg(
            Arg::with_name(PATTERN)
                .long(PATTERN)
                .short("p")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .conflicts_with_all(&[ALL, LIST])
                .help("Render this pattern; may be repeated"),
        )
        .arg(
            Arg::with_name(ALL)
                .long(ALL)
                .conflicts_with(LIST)
                .help("Render every pattern"),
        )
        .arg(
            Arg::with_name(LIST)
                .long(LIST)
                .help("List pattern names and exit"),
        )
        .get_matches()
}

// Validators have already run, so these only fail on clap misuse.
fn value<T: FromStr>(matches: &ArgMatches, name: &str) -> Option<T> {
    matches.value_of(name).and_then(|s| T::from_str(s).ok())
}

fn config_from(matches: &ArgMatches) -> RenderConfig {
    let defaults = RenderConfig::default();
    let (width, height) = matches
        .value_of(SIZE)
        .and_then(|s| parse_pair(s, 'x'))
        .unwrap_or((defaults.width, defaults.height));
    let dpi = value(matches, DPI).unwrap_or(defaults.dpi.0);
    RenderConfig {
        width,
        height,
        output_dir: matches
            .value_of(OUTPUT_DIR)
            .map(PathBuf::from)
            .unwrap_or(defaults.output_dir),
        samples: value(matches, SAMPLES),
        max_iter: value(matches, ITERATIONS),
        stride: value(matches, STRIDE).unwrap_or(defaults.stride),
        epsilon: value(matches, EPSILON).unwrap_or(defaults.epsilon),
        dpi: (dpi, dpi),
        seed: value(matches, SEED),
        signature: if matches.is_present(SIGNATURE) {
            Some(signature_from(matches))
        } else {
            None
        },
        show: matches.is_present(SHOW),
        divergence: if matches.is_present(STRICT) {
            DivergencePolicy::Abort
        } else {
            DivergencePolicy::Truncate
        },
        threads: value(matches, THREADS).unwrap_or(defaults.threads),
    }
}

fn signature_from(matches: &ArgMatches) -> Signature {
    let mut signature = match matches.value_of(SIGNATURE_TEXT) {
        Some(text) => Signature::new(text),
        None => Signature::default(),
    };
    if let Some(fonts) = matches.values_of(FONT) {
        signature.fonts = fonts.map(PathBuf::from).collect();
    }
    signature
}

fn print_reports(reports: &[RunReport]) -> usize {
    let mut failed = 0;
    for r in reports {
        match &r.outcome {
            Ok(path) => println!("{}: saved {}", r.name, path.display()),
            Err(e) => {
                failed += 1;
                eprintln!("{}: FAILED: {}", r.name, e);
            }
        }
    }
    failed
}

fn selected(matches: &ArgMatches, patterns: &[PatternSpec]) -> Result<Vec<PatternSpec>, String> {
    if matches.is_present(ALL) {
        return Ok(patterns.to_vec());
    }
    let mut chosen = vec![];
    for name in matches.values_of(PATTERN).into_iter().flatten() {
        match find(patterns, name) {
            Some(p) => chosen.push(p.clone()),
            None => return Err(format!("Unknown pattern: {}", name)),
        }
    }
    Ok(chosen)
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mathpaper=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let matches = args();
    let patterns = catalog();

    if matches.is_present(LIST) {
        for p in &patterns {
            println!("{:<24} {}", p.name, p.title);
        }
        return;
    }

    let config = config_from(&matches);
    let surface = ImageSurface;

    if matches.is_present(ALL) || matches.is_present(PATTERN) {
        let chosen = match selected(&matches, &patterns) {
            Ok(chosen) => chosen,
            Err(e) => {
                eprintln!("{}", e);
                process::exit(2);
            }
        };
        info!(patterns = chosen.len(), threads = config.threads, "starting batch");
        let reports = run_batch(&chosen, &config, &surface);
        let failed = print_reports(&reports);
        if failed > 0 && reports.len() == 1 {
            process::exit(1);
        }
        return;
    }

    let signature = signature_from(&matches);
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut menu = Menu::new(&patterns, stdin.lock(), stdout.lock());
    let outcome = menu.run(&signature.text, |chosen, sign| {
        let config = RenderConfig {
            signature: if sign { Some(signature.clone()) } else { None },
            ..config.clone()
        };
        run_batch(chosen, &config, &surface)
    });
    if let Err(e) = outcome {
        error!(error = %e, "menu i/o failed");
        process::exit(1);
    }
}
