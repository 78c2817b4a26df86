use std::convert::Infallible;
use std::time::Duration;

use clap::Parser;
use clap::ValueEnum;
use futures::StreamExt;
use futures::future::ready;
use tokio::time::Instant;
use tracing_subscriber::EnvFilter;

use stream_shot::Mode;
use stream_shot::Throttle;
use stream_shot::ThrottleStreamExt;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliMode {
    Shaping,
    Enforcing,
}

impl From<CliMode> for Mode {
    fn from(mode: CliMode) -> Self {
        match mode {
            CliMode::Shaping => Mode::Shaping,
            CliMode::Enforcing => Mode::Enforcing,
        }
    }
}

/// Throttle a counter stream and print when each element comes out.
#[derive(Debug, Parser)]
struct Args {
    /// Elements allowed per `--per`
    #[arg(long, default_value_t = 5)]
    elements: i64,
    /// Refill window, e.g. "1s" or "250ms"
    #[arg(long, default_value = "1s", value_parser = humantime::parse_duration)]
    per: Duration,
    /// Extra capacity above `--elements`
    #[arg(long, default_value_t = 0)]
    burst: i64,
    #[arg(long, value_enum, default_value_t = CliMode::Shaping)]
    mode: CliMode,
    /// Number of elements to produce
    #[arg(long, default_value_t = 20)]
    count: u64,
    /// Make element `n` cost `n % weight + 1` tokens
    #[arg(long)]
    weight: Option<u64>,
    /// Pause between produced elements, e.g. "50ms"
    #[arg(long, value_parser = humantime::parse_duration)]
    gap: Option<Duration>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let throttle = Throttle::new(args.elements, args.per, args.mode.into())?.with_burst(args.burst);
    let weight = args.weight;
    let gap = args.gap;

    println!("🚦 {:?}", throttle);

    let upstream = futures::stream::iter(0..args.count).then(move |n| async move {
        if let Some(gap) = gap {
            tokio::time::sleep(gap).await;
        }
        Ok::<_, Infallible>(n)
    });
    let cost = move |n: &u64| {
        let cost = weight.map_or(1, |w| n % w.max(1) + 1);
        ready(Ok::<i64, Infallible>(cost as i64))
    };

    let start = Instant::now();
    let mut paced = std::pin::pin!(upstream.throttle_with(&throttle, cost));
    while let Some(Ok(n)) = paced.next().await {
        println!("[{:>8.3?}] element {n}", start.elapsed());
    }

    println!("\n🏁 Done after {:.2?}", start.elapsed());
    Ok(())
}
