use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use log::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use structopt::*;

use byesched::instance::{format_instance_xml, load_instance};
use byesched::schedule::{format_schedule, format_schedule_xml};
use byesched::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Algorithm {
    Iterate,
    Topological,
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "iterate" => Ok(Algorithm::Iterate),
            "topological" => Ok(Algorithm::Topological),
            _ => Err(format!("unknown algorithm {:?}, expected iterate or topological", s)),
        }
    }
}

#[derive(StructOpt, Debug)]
struct Opt {
    #[structopt(name = "FILE", parse(from_os_str), required_unless = "random")]
    files: Vec<PathBuf>,

    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,

    #[structopt(long)]
    quiet: bool,

    /// iterate (integer program over increasing round counts) or topological (layering)
    #[structopt(short, long, default_value = "iterate")]
    algorithm: Algorithm,

    /// standard (fewest byes) or consecutive (spread byes out)
    #[structopt(short, long, default_value = "standard")]
    formulation: Formulation,

    /// Seconds per fixed-round solve before it counts as infeasible
    #[structopt(short, long, default_value = "600")]
    time_limit: f32,

    /// pairs (N(N-1)/2) or twice-teams (2N-1)
    #[structopt(long, default_value = "pairs")]
    round_bound: RoundBound,

    /// Run the integer program even when the precedence graph has a cycle
    #[structopt(long)]
    no_precheck: bool,

    /// Number of round counts solved concurrently
    #[structopt(short, long, default_value = "1")]
    window: usize,

    /// Solve a random instance with this many teams
    #[structopt(long)]
    random: Option<usize>,

    #[structopt(long)]
    seed: Option<u64>,

    #[structopt(short, long, parse(from_os_str))]
    xml_solutions: Option<PathBuf>,
}

fn time_limit(seconds: f32) -> Result<Duration, String> {
    Duration::try_from_secs_f32(seconds)
        .map_err(|e| format!("invalid --time-limit {}: {}", seconds, e))
}

fn report(
    name: &str,
    solver: &mut impl ByesAlgorithm,
    options: &Opt,
) -> Result<(), Box<dyn std::error::Error>> {
    solver.solve();
    println!("{}: {}", name, solver.status());

    let schedule = match solver.schedule() {
        Ok(schedule) => schedule,
        Err(e) => {
            info!("{}: {}", name, e);
            return Ok(());
        }
    };
    debug_assert!(schedule.verify());
    info!("{} rounds, byes per team {:?}", schedule.num_rounds(), schedule.byes_per_team());

    if !options.quiet {
        println!("{}", format_schedule(schedule));
    }

    if let Some(xml_out) = options.xml_solutions.as_ref() {
        use std::fs::OpenOptions;
        use std::io::prelude::*;
        info!("Writing solution to {:?}", xml_out);
        let out = format_schedule_xml(name, schedule)?;
        let mut file = OpenOptions::new().create(true).append(true).open(xml_out)?;
        writeln!(file, "{}", out)?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let options = Opt::from_args();

    stderrlog::StdErrLog::new()
        .verbosity(usize::from(options.verbose))
        .quiet(options.quiet)
        .module(module_path!())
        .show_module_names(true)
        .color(stderrlog::ColorChoice::Auto)
        .init()?;

    info!("Arguments {:#?}", options);

    let _finalize_xml = options.xml_solutions.clone().map(|f| {
        dispose::defer(move || {
            info!("Writing header/footer of xml solution set file");
            let contents = std::fs::read_to_string(&f).unwrap_or_else(|_| String::new());
            let wrapped = format!("<MultipleSchedules>\n{}</MultipleSchedules>\n", contents);
            if let Err(e) = std::fs::write(&f, wrapped) {
                error!("Could not finish {:?}: {}", f, e);
            }
        })
    });

    if let Some(f) = options.xml_solutions.as_ref() {
        // Clear the output file
        std::fs::write(f, "")?;
    }

    let mut instances = Vec::new();
    for path in options.files.iter() {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        instances.push((name, load_instance(path)?));
    }
    if let Some(num_teams) = options.random {
        let mut rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let tp = random_team_priority(num_teams, &mut rng)?;
        if !options.quiet {
            print!("{}", format_instance_xml(&tp)?);
        }
        instances.push((format!("random-{}", num_teams), tp));
    }

    let limit = time_limit(options.time_limit)?;
    let config = SearchConfig {
        ilp: IlpConfig {
            formulation: options.formulation,
            time_limit: limit,
        },
        round_bound: options.round_bound,
        cycle_precheck: !options.no_precheck,
        window: options.window,
    };

    for (name, tp) in instances.iter() {
        info!("Solving {} with {} teams", name, tp.num_teams());
        match options.algorithm {
            Algorithm::Iterate => {
                let mut solver = IterateRoundsSolver::from_team_priority(tp, config);
                report(name, &mut solver, &options)?;
            }
            Algorithm::Topological => {
                let mut solver = TopologicalSortSolver::from_team_priority(tp);
                report(name, &mut solver, &options)?;
            }
        }
    }

    Ok(())
}
