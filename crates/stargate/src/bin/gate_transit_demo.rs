use stargate::simulator::{designation_or_unknown, GateConfig, GateScenario, DEFAULT_DIAL_DELAY};

const DEFAULT_TICKS: u64 = 1_000;

struct CliOptions {
    scenario: GateScenario,
    ticks: u64,
    seed: u64,
    save_dir: Option<String>,
}

fn print_usage() {
    println!("Usage: gate_transit_demo [scenario] [--ticks <n>] [--seed <n>] [--save <dir>]");
    println!("Available scenarios: {}", GateScenario::variants().join(", "));
}

fn parse_u64(flag: &str, value: Option<&String>) -> Result<u64, String> {
    let value = value.ok_or_else(|| format!("{flag} requires a value"))?;
    value
        .parse::<u64>()
        .map_err(|_| format!("{flag} expects a non-negative integer, got {value}"))
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut options = CliOptions {
        scenario: GateScenario::TwinGates,
        ticks: DEFAULT_TICKS,
        seed: 0,
        save_dir: None,
    };
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--ticks" => options.ticks = parse_u64("--ticks", iter.next())?,
            "--seed" => options.seed = parse_u64("--seed", iter.next())?,
            "--save" => {
                options.save_dir = Some(iter.next().ok_or("--save requires a directory")?.clone());
            }
            name => {
                options.scenario = GateScenario::parse(name).ok_or_else(|| {
                    format!(
                        "Unknown scenario: {name}\nAvailable scenarios: {}",
                        GateScenario::variants().join(", ")
                    )
                })?;
            }
        }
    }
    Ok(options)
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if matches!(args.get(1).map(|s| s.as_str()), Some("--help") | Some("-h")) {
        print_usage();
        return;
    }
    let options = match parse_options(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{message}");
            std::process::exit(1);
        }
    };

    let config = match GateConfig::from_default_sources() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };
    let mut world = match options.scenario.build(config, options.seed) {
        Ok(world) => world,
        Err(err) => {
            eprintln!("failed to build scenario: {err}");
            std::process::exit(1);
        }
    };
    let outcome = match world.run(DEFAULT_DIAL_DELAY, options.ticks) {
        Ok(outcome) => outcome,
        Err(err) => {
            eprintln!("scenario run failed: {err}");
            std::process::exit(1);
        }
    };

    let destination = options.scenario.destination_address();
    println!("scenario: {}", options.scenario.as_str());
    println!("seed: {}", options.seed);
    println!("ticks: {}", outcome.final_time);
    println!(
        "destination: {} ({})",
        destination,
        designation_or_unknown(Some(destination))
    );
    match outcome.opened_at {
        Some(tick) => println!("opened_at: {tick}"),
        None => println!("opened_at: never"),
    }
    println!("traveller: {:?}", outcome.traveller);
    println!("origin_active: {}", outcome.origin_active);
    for endpoint in world.kernel.endpoints() {
        println!(
            "gate {} [{}]: {:?}",
            endpoint.id(),
            designation_or_unknown(endpoint.address()),
            endpoint.state()
        );
    }
    println!("events: {}", world.kernel.journal().len());

    if let Some(dir) = options.save_dir {
        if let Err(err) = world.kernel.save_to_dir(&dir) {
            eprintln!("failed to save to {dir}: {err}");
            std::process::exit(1);
        }
        println!("saved: {dir}");
    }
}
