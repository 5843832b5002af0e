use std::{env, io};

use tracing_subscriber::EnvFilter;

use course_calendar::{cli, server};

#[tokio::main]
async fn main() -> io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = cli::parse(env::args().skip(1).collect());

    server::serve(
        args.address,
        server::AppState {
            term_year: args.term_year,
        },
    )
    .await
}
