//! 가격 갱신 CLI.

use anyhow::Context;
use chronos_collector::{
    build_refresh_service, default_price_providers, open_store, run_universe_scan,
    MarketRefreshScheduler,
};
use chronos_core::{init_logging, AppConfig, LogConfig};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "chronos-collector")]
#[command(about = "Chronos price refresh and signal collector", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 설정 파일 경로
    #[arg(long, default_value = "config/default.toml")]
    config: String,

    /// 가격 Provider (기본값: 설정의 refresh.default_provider)
    #[arg(long)]
    provider: Option<String>,

    /// 봉 간격 (기본값: 설정의 refresh.default_interval)
    #[arg(long)]
    interval: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// 지정한 종목의 가격 갱신 후 시그널 재계산
    Refresh {
        /// 쉼표로 구분한 티커 목록 (예: "AAPL,MSFT")
        #[arg(long, value_delimiter = ',', required = true)]
        tickers: Vec<String>,
    },

    /// 추적 중인 모든 종목의 시그널 재계산
    Signals,

    /// 유니버스 스캔: 갱신 → 시그널 → 후보 생성
    Scan {
        #[arg(long)]
        universe: i64,
        #[arg(long)]
        template: i64,
    },

    /// 데몬 모드: 장중 갱신 스케줄러 실행
    Daemon,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let app = AppConfig::load(&cli.config).context("설정 로드 실패")?;

    init_logging(LogConfig::from_settings(&app.logging))
        .map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {e}"))?;

    tracing::info!("Chronos Collector 시작");

    let store = open_store(&app.database).await?;
    let (service, config) = build_refresh_service(&app, store, default_price_providers()?)?;

    let provider = cli.provider.unwrap_or_else(|| config.default_provider.clone());
    let interval = cli.interval.unwrap_or_else(|| config.default_interval.clone());

    match cli.command {
        Commands::Refresh { tickers } => {
            let stats = service.refresh_tickers(&tickers, &provider, &interval).await;
            stats.log_summary("가격 갱신");
        }
        Commands::Signals => {
            let stats = service.recompute_all_signals(&provider, &interval).await?;
            stats.log_summary("시그널 재계산");
        }
        Commands::Scan { universe, template } => {
            let summary =
                run_universe_scan(&service, universe, template, &provider, &interval).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Daemon => {
            tracing::info!("=== 데몬 모드 시작 ===");

            let cancel = CancellationToken::new();
            let handle = MarketRefreshScheduler::new(service, &config).spawn(cancel.clone());

            tokio::signal::ctrl_c().await?;
            tracing::info!("종료 신호 수신, 데몬 종료 중...");
            cancel.cancel();
            handle.await?;
        }
    }

    tracing::info!("Chronos Collector 종료");
    Ok(())
}
