//! # focusstreak 웹 서버 진입점
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. SQLite 데이터베이스 연결 풀 생성 (WAL 모드)
//! 4. 데이터베이스 마이그레이션 실행
//! 5. 야간 스트릭 점검 작업 시작
//! 6. API 라우터 설정
//! 7. HTTP 서버 시작
//!
//! 모든 모듈은 라이브러리 크레이트(lib.rs)에 있고, 여기서는 조립만 합니다.
//! 통합 테스트도 같은 `routes::api_routes`를 사용합니다.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Result; // main에서만 쓰는 범용 에러 타입
use axum::Router;
use focusstreak::{
    config::Config,
    routes::{self, AppState},
    services::{recorder::RecorderConfig, sweep},
};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1단계: 환경변수 로딩 ──
    // .env 파일이 없어도 에러 없이 넘어갑니다.
    dotenvy::dotenv().ok();

    // ── 2단계: 로깅(tracing) 초기화 ──
    // RUST_LOG가 없으면 focusstreak, tower_http, axum 모듈을 debug 레벨로 설정
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "focusstreak=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // ── 3단계: 설정 로딩 ──
    let config = Config::from_env()?;
    tracing::info!(
        day_offset = %config.day_offset,
        "Starting focusstreak server on {}:{}",
        config.host,
        config.port
    );

    // ── 4단계: SQLite 연결 풀 생성 ──
    // WAL 모드: 쓰기 중에도 읽기가 막히지 않습니다.
    // busy_timeout: 다른 연결이 쓰기 잠금을 잡고 있으면 바로 실패하지 않고 기다립니다.
    //               그래도 잠금을 못 얻으면 세션 기록기가 재시도합니다.
    let connect_options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await?;

    // ── 5단계: 데이터베이스 마이그레이션 실행 ──
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    // ── 6단계: 야간 스트릭 점검 ──
    // 여러 인스턴스를 띄울 때는 한 곳에서만 켜야 합니다.
    // (sweep_runs 기록으로 같은 날짜의 이중 차감은 막힙니다.)
    if config.streak_sweep_enabled {
        sweep::spawn_streak_sweeper(pool.clone(), config.day_offset);
        tracing::info!("Streak sweeper started");
    } else {
        tracing::warn!("Streak sweeper disabled (STREAK_SWEEP_ENABLED=false)");
    }

    // ── 7단계: 애플리케이션 상태(State) 생성 ──
    let state = AppState {
        pool: pool.clone(),
        jwt_secret: config.jwt_secret.clone(),
        recorder: RecorderConfig {
            day_offset: config.day_offset,
            max_retries: config.record_max_retries,
        },
    };

    // ── 8단계: CORS 미들웨어 설정 ──
    // 개발 환경에서는 모두 허용. 프로덕션에서는 특정 도메인만 허용해야 합니다.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // ── 9단계: 라우터 조립 + 프론트엔드 정적 파일 서빙 ──
    // SPA이므로 찾을 수 없는 경로는 index.html로 돌려보냅니다.
    let frontend_dist = Path::new(&config.frontend_dist);
    let app = if frontend_dist.exists() {
        tracing::info!("Serving frontend static files from {}", config.frontend_dist);

        let serve_dir = ServeDir::new(frontend_dist)
            .not_found_service(ServeFile::new(frontend_dist.join("index.html")));

        Router::new()
            .nest("/api/v1", routes::api_routes(state))
            .fallback_service(serve_dir)
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    } else {
        tracing::warn!("Frontend dist directory not found, serving API only");

        Router::new()
            .nest("/api/v1", routes::api_routes(state))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    };

    // ── 10단계: 서버 시작 ──
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
