use argh::FromArgs;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tagcheck::clickup::Tag;
use tagcheck::config::{self, SuiteConfig};
use tagcheck::{Error, Store, StubState, Suite, create_app};

/// Exit code for a run that could not start.
const SETUP_FAILURE: u8 = 2;

#[derive(FromArgs, Debug)]
/// tagcheck: ordered checks against the ClickUp space and task tag API.
struct Args {
    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs, Debug)]
#[argh(subcommand)]
enum Command {
    Run(RunArgs),
    Stub(StubArgs),
}

#[derive(FromArgs, Debug)]
/// Run the tag scenario and exit non-zero unless every step passes.
#[argh(subcommand, name = "run")]
struct RunArgs {
    /// path to the .properties file with apiKey, spaceId and task_id
    #[argh(option, short = 'c', default = "String::from(config::DEFAULT_CONFIG_PATH)")]
    config: String,

    /// override the API base URL from the config file
    #[argh(option)]
    base_url: Option<String>,
}

#[derive(FromArgs, Debug)]
/// Serve an in-memory imitation of the tag API.
#[argh(subcommand, name = "stub")]
struct StubArgs {
    /// host to bind to
    #[argh(option, default = "String::from(\"127.0.0.1\")")]
    host: String,

    /// port to listen on (0 for random available port)
    #[argh(option, short = 'p', default = "0")]
    port: u16,

    /// token clients must send in the Authorization header
    #[argh(option, default = "String::from(\"pk_stub\")")]
    api_key: String,

    /// id of the seeded space
    #[argh(option, default = "String::from(\"stub-space\")")]
    space_id: String,

    /// id of the seeded task
    #[argh(option, default = "String::from(\"stub-task\")")]
    task_id: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tagcheck=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Args = argh::from_env();
    let result = match args.command {
        Command::Run(run_args) => run(run_args).await,
        Command::Stub(stub_args) => serve_stub(stub_args).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::from(SETUP_FAILURE)
        }
    }
}

async fn run(args: RunArgs) -> Result<ExitCode, Error> {
    let mut config = SuiteConfig::load(&args.config)?;
    if let Some(base_url) = &args.base_url {
        config = config.with_base_url(base_url)?;
    }
    tracing::debug!("{:?}", config);

    let suite = Suite::from_config(&config)?;
    let report = suite.run().await;
    println!("{}", report);

    if report.all_passed() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

async fn serve_stub(args: StubArgs) -> Result<ExitCode, Error> {
    let store = Store::default()
        .with_space(&args.space_id, [Tag::new("seed", "#7B68EE")])
        .with_task(&args.task_id, "Stub task");
    let state = Arc::new(StubState::new(&args.api_key, store));

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    tracing::info!("http://{}", actual_addr);
    tracing::info!(
        "config: apiKey={} spaceId={} task_id={} baseUrl=http://{}/api/v2",
        args.api_key,
        args.space_id,
        args.task_id,
        actual_addr
    );

    axum::serve(listener, create_app(state)).await?;
    Ok(ExitCode::SUCCESS)
}
