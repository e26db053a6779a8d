//! PostgreSQL 저장소.
//!
//! 스키마는 루트 `migrations/`에 있으며 [`PgStore::migrate`]로 적용합니다.
//! 시계열 일괄 쓰기는 UNNEST + `ON CONFLICT DO UPDATE` 패턴을 사용합니다.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use chronos_core::{
    normalize_ticker, CacheRecord, CacheStatus, CandidateStatus, DatabaseConfig, NewCandidate,
    NewTemplate, NewUniverse, OhlcvRow, SignalRow, Stock, StrategyTemplate, TemplateKind, Ticker,
    TradeCandidate, Universe, UniverseUpdate,
};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use tracing::{debug, info, instrument};

use super::{
    dedup_by_date, CacheStatusStore, CandidateStore, OhlcvStore, SignalStore, StockStore, StoreHealth,
    TemplateStore, UniverseStore,
};
use crate::error::{DataError, Result};

const CHUNK_SIZE: usize = 500;

// =============================================================================
// Records
// =============================================================================

#[derive(Debug, Clone, FromRow)]
struct StockRecord {
    id: i64,
    ticker: String,
    name: Option<String>,
}

impl From<StockRecord> for Stock {
    fn from(r: StockRecord) -> Self {
        Stock {
            id: r.id,
            ticker: r.ticker,
            name: r.name,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
struct UniverseRecord {
    id: i64,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<UniverseRecord> for Universe {
    fn from(r: UniverseRecord) -> Self {
        Universe {
            id: r.id,
            name: r.name,
            description: r.description,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
struct OhlcvRecord {
    as_of: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: Option<i64>,
}

impl From<OhlcvRecord> for OhlcvRow {
    fn from(r: OhlcvRecord) -> Self {
        OhlcvRow {
            date: r.as_of,
            open: r.open,
            high: r.high,
            low: r.low,
            close: r.close,
            volume: r.volume,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
struct CacheStatusRecord {
    stock_id: i64,
    provider: String,
    interval: String,
    status: String,
    last_fetched_at: DateTime<Utc>,
    detail: Option<String>,
}

impl TryFrom<CacheStatusRecord> for CacheRecord {
    type Error = DataError;

    fn try_from(r: CacheStatusRecord) -> Result<Self> {
        Ok(CacheRecord {
            stock_id: r.stock_id,
            provider: r.provider,
            interval: r.interval,
            status: r.status.parse().map_err(DataError::InvalidData)?,
            last_fetched_at: r.last_fetched_at,
            detail: r.detail,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
struct SignalRecord {
    as_of: NaiveDate,
    rsi: Option<f64>,
    macd: Option<f64>,
    macd_signal: Option<f64>,
    ema_20: Option<f64>,
    ema_50: Option<f64>,
    bb_upper: Option<f64>,
    bb_lower: Option<f64>,
}

impl From<SignalRecord> for SignalRow {
    fn from(r: SignalRecord) -> Self {
        SignalRow {
            date: r.as_of,
            rsi: r.rsi,
            macd: r.macd,
            macd_signal: r.macd_signal,
            ema_20: r.ema_20,
            ema_50: r.ema_50,
            bb_upper: r.bb_upper,
            bb_lower: r.bb_lower,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
struct TemplateRecord {
    id: i64,
    kind: String,
    name: String,
    version: i32,
    description: Option<String>,
    config_json: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl TryFrom<TemplateRecord> for StrategyTemplate {
    type Error = DataError;

    fn try_from(r: TemplateRecord) -> Result<Self> {
        Ok(StrategyTemplate {
            id: r.id,
            kind: r.kind.parse().map_err(DataError::InvalidData)?,
            name: r.name,
            version: r.version,
            description: r.description,
            config_json: r.config_json,
            created_at: r.created_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
struct CandidateRecord {
    id: i64,
    universe_id: i64,
    template_id: i64,
    ticker: String,
    as_of: DateTime<Utc>,
    score: f64,
    status: String,
    reason_code: Option<String>,
    payload_json: serde_json::Value,
}

impl TryFrom<CandidateRecord> for TradeCandidate {
    type Error = DataError;

    fn try_from(r: CandidateRecord) -> Result<Self> {
        Ok(TradeCandidate {
            id: r.id,
            universe_id: r.universe_id,
            template_id: r.template_id,
            ticker: r.ticker,
            as_of: r.as_of,
            score: r.score,
            status: r.status.parse().map_err(DataError::InvalidData)?,
            reason_code: r.reason_code,
            payload_json: r.payload_json,
        })
    }
}

fn convert_all<R, T>(records: Vec<R>) -> Result<Vec<T>>
where
    T: TryFrom<R, Error = DataError>,
{
    records.into_iter().map(T::try_from).collect()
}

// =============================================================================
// Store
// =============================================================================

/// sqlx `PgPool` 기반 저장소.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// 설정으로 연결 풀을 생성합니다.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        info!("Connecting to database...");

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        info!("Database connection established");

        Ok(Self { pool })
    }

    /// 기존 연결 풀에서 생성합니다.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// 데이터베이스 마이그레이션을 실행합니다.
    pub async fn migrate(&self) -> Result<()> {
        info!("Running database migrations...");

        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DataError::MigrationError(e.to_string()))?;

        info!("Migrations completed successfully");
        Ok(())
    }

    async fn find_stock(&self, ticker: &str) -> Result<Option<Stock>> {
        let record: Option<StockRecord> =
            sqlx::query_as("SELECT id, ticker, name FROM stocks WHERE ticker = $1")
                .bind(ticker)
                .fetch_optional(&self.pool)
                .await?;
        Ok(record.map(Stock::from))
    }
}

#[async_trait]
impl StockStore for PgStore {
    #[instrument(skip(self))]
    async fn get_or_create_stock(&self, ticker: &str) -> Result<Stock> {
        let ticker = Ticker::parse(ticker)
            .map_err(|e| DataError::InvalidData(e.message().to_string()))?
            .into_inner();

        if let Some(stock) = self.find_stock(&ticker).await? {
            return Ok(stock);
        }

        let inserted: std::result::Result<StockRecord, DataError> =
            sqlx::query_as("INSERT INTO stocks (ticker) VALUES ($1) RETURNING id, ticker, name")
                .bind(&ticker)
                .fetch_one(&self.pool)
                .await
                .map_err(DataError::from);

        match inserted {
            Ok(record) => Ok(record.into()),
            // 동시 삽입 경합: 다른 쪽이 만든 행을 다시 읽음
            Err(DataError::DuplicateError(_)) => {
                debug!(ticker = %ticker, "종목 생성 경합, 재조회");
                self.find_stock(&ticker)
                    .await?
                    .ok_or_else(|| DataError::NotFound(format!("stock {ticker}")))
            }
            Err(e) => Err(e),
        }
    }

    async fn get_stock_by_ticker(&self, ticker: &str) -> Result<Option<Stock>> {
        self.find_stock(&normalize_ticker(ticker)).await
    }

    async fn list_tracked_stocks(&self) -> Result<Vec<Stock>> {
        let records: Vec<StockRecord> = sqlx::query_as(
            r#"
            SELECT DISTINCT s.id, s.ticker, s.name
            FROM stocks s
            JOIN universe_members m ON m.stock_id = s.id
            ORDER BY s.ticker
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(records.into_iter().map(Stock::from).collect())
    }
}

#[async_trait]
impl UniverseStore for PgStore {
    #[instrument(skip(self))]
    async fn create_universe(&self, new: NewUniverse) -> Result<Universe> {
        let record: UniverseRecord = sqlx::query_as(
            r#"
            INSERT INTO universes (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, created_at
            "#,
        )
        .bind(&new.name)
        .bind(&new.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(record.into())
    }

    async fn get_universe(&self, id: i64) -> Result<Option<Universe>> {
        let record: Option<UniverseRecord> = sqlx::query_as(
            "SELECT id, name, description, created_at FROM universes WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record.map(Universe::from))
    }

    async fn list_universes(&self, limit: i64, offset: i64) -> Result<Vec<Universe>> {
        let records: Vec<UniverseRecord> = sqlx::query_as(
            r#"
            SELECT id, name, description, created_at
            FROM universes
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(records.into_iter().map(Universe::from).collect())
    }

    async fn update_universe(&self, id: i64, update: UniverseUpdate) -> Result<Option<Universe>> {
        let record: Option<UniverseRecord> = sqlx::query_as(
            r#"
            UPDATE universes
            SET name = COALESCE($2, name),
                description = COALESCE($3, description)
            WHERE id = $1
            RETURNING id, name, description, created_at
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.description)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record.map(Universe::from))
    }

    async fn delete_universe(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM universes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_member(&self, universe_id: i64, stock_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO universe_members (universe_id, stock_id)
            VALUES ($1, $2)
            ON CONFLICT (universe_id, stock_id) DO NOTHING
            "#,
        )
        .bind(universe_id)
        .bind(stock_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_member(&self, universe_id: i64, stock_id: i64) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM universe_members WHERE universe_id = $1 AND stock_id = $2")
                .bind(universe_id)
                .bind(stock_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_members(&self, universe_id: i64) -> Result<Vec<Stock>> {
        let records: Vec<StockRecord> = sqlx::query_as(
            r#"
            SELECT s.id, s.ticker, s.name
            FROM stocks s
            JOIN universe_members m ON m.stock_id = s.id
            WHERE m.universe_id = $1
            ORDER BY s.ticker
            "#,
        )
        .bind(universe_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(records.into_iter().map(Stock::from).collect())
    }
}

#[async_trait]
impl OhlcvStore for PgStore {
    #[instrument(skip(self, rows), fields(count = rows.len()))]
    async fn upsert_ohlcv(
        &self,
        stock_id: i64,
        provider: &str,
        interval: &str,
        rows: &[OhlcvRow],
    ) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        let rows = dedup_by_date(rows, |r| r.date);
        let mut written = 0;
        for chunk in rows.chunks(CHUNK_SIZE) {
            let dates: Vec<NaiveDate> = chunk.iter().map(|r| r.date).collect();
            let opens: Vec<f64> = chunk.iter().map(|r| r.open).collect();
            let highs: Vec<f64> = chunk.iter().map(|r| r.high).collect();
            let lows: Vec<f64> = chunk.iter().map(|r| r.low).collect();
            let closes: Vec<f64> = chunk.iter().map(|r| r.close).collect();
            let volumes: Vec<Option<i64>> = chunk.iter().map(|r| r.volume).collect();

            let result = sqlx::query(
                r#"
                INSERT INTO stock_ohlcv
                    (stock_id, provider, interval, as_of, open, high, low, close, volume)
                SELECT $1, $2, $3, t.*
                FROM UNNEST(
                    $4::date[], $5::float8[], $6::float8[], $7::float8[], $8::float8[],
                    $9::int8[]
                ) AS t(as_of, open, high, low, close, volume)
                ON CONFLICT (stock_id, provider, interval, as_of) DO UPDATE SET
                    open = EXCLUDED.open,
                    high = EXCLUDED.high,
                    low = EXCLUDED.low,
                    close = EXCLUDED.close,
                    volume = EXCLUDED.volume
                "#,
            )
            .bind(stock_id)
            .bind(provider)
            .bind(interval)
            .bind(&dates)
            .bind(&opens)
            .bind(&highs)
            .bind(&lows)
            .bind(&closes)
            .bind(&volumes)
            .execute(&self.pool)
            .await
            .map_err(|e| DataError::InsertError(e.to_string()))?;

            written += result.rows_affected() as usize;
        }

        debug!(stock_id, provider, interval, written, "OHLCV 저장");
        Ok(written)
    }

    async fn list_ohlcv(
        &self,
        stock_id: i64,
        provider: &str,
        interval: &str,
        limit: Option<i64>,
    ) -> Result<Vec<OhlcvRow>> {
        // 최근 N개를 내림차순으로 가져와 뒤집음
        let records: Vec<OhlcvRecord> = sqlx::query_as(
            r#"
            SELECT as_of, open, high, low, close, volume
            FROM stock_ohlcv
            WHERE stock_id = $1 AND provider = $2 AND interval = $3
            ORDER BY as_of DESC
            LIMIT $4
            "#,
        )
        .bind(stock_id)
        .bind(provider)
        .bind(interval)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut rows: Vec<OhlcvRow> = records.into_iter().map(OhlcvRow::from).collect();
        rows.reverse();
        Ok(rows)
    }
}

#[async_trait]
impl CacheStatusStore for PgStore {
    async fn get_cache_status(
        &self,
        stock_id: i64,
        provider: &str,
        interval: &str,
    ) -> Result<Option<CacheRecord>> {
        let record: Option<CacheStatusRecord> = sqlx::query_as(
            r#"
            SELECT stock_id, provider, interval, status, last_fetched_at, detail
            FROM stock_cache_status
            WHERE stock_id = $1 AND provider = $2 AND interval = $3
            "#,
        )
        .bind(stock_id)
        .bind(provider)
        .bind(interval)
        .fetch_optional(&self.pool)
        .await?;
        record.map(CacheRecord::try_from).transpose()
    }

    #[instrument(skip(self, detail))]
    async fn upsert_cache_status(
        &self,
        stock_id: i64,
        provider: &str,
        interval: &str,
        status: CacheStatus,
        detail: Option<String>,
    ) -> Result<CacheRecord> {
        let record: CacheStatusRecord = sqlx::query_as(
            r#"
            INSERT INTO stock_cache_status
                (stock_id, provider, interval, status, last_fetched_at, detail)
            VALUES ($1, $2, $3, $4, NOW(), $5)
            ON CONFLICT (stock_id, provider, interval) DO UPDATE SET
                status = EXCLUDED.status,
                last_fetched_at = EXCLUDED.last_fetched_at,
                detail = EXCLUDED.detail
            RETURNING stock_id, provider, interval, status, last_fetched_at, detail
            "#,
        )
        .bind(stock_id)
        .bind(provider)
        .bind(interval)
        .bind(status.as_str())
        .bind(&detail)
        .fetch_one(&self.pool)
        .await?;
        record.try_into()
    }
}

#[async_trait]
impl SignalStore for PgStore {
    #[instrument(skip(self, rows), fields(count = rows.len()))]
    async fn upsert_signals(
        &self,
        stock_id: i64,
        provider: &str,
        interval: &str,
        rows: &[SignalRow],
    ) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        let rows = dedup_by_date(rows, |r| r.date);
        let mut written = 0;
        for chunk in rows.chunks(CHUNK_SIZE) {
            let column = |f: fn(&SignalRow) -> Option<f64>| -> Vec<Option<f64>> {
                chunk.iter().map(f).collect()
            };
            let dates: Vec<NaiveDate> = chunk.iter().map(|r| r.date).collect();

            let result = sqlx::query(
                r#"
                INSERT INTO stock_signals
                    (stock_id, provider, interval, as_of,
                     rsi, macd, macd_signal, ema_20, ema_50, bb_upper, bb_lower)
                SELECT $1, $2, $3, t.*
                FROM UNNEST(
                    $4::date[], $5::float8[], $6::float8[], $7::float8[],
                    $8::float8[], $9::float8[], $10::float8[], $11::float8[]
                ) AS t(as_of, rsi, macd, macd_signal, ema_20, ema_50, bb_upper, bb_lower)
                ON CONFLICT (stock_id, provider, interval, as_of) DO UPDATE SET
                    rsi = EXCLUDED.rsi,
                    macd = EXCLUDED.macd,
                    macd_signal = EXCLUDED.macd_signal,
                    ema_20 = EXCLUDED.ema_20,
                    ema_50 = EXCLUDED.ema_50,
                    bb_upper = EXCLUDED.bb_upper,
                    bb_lower = EXCLUDED.bb_lower
                "#,
            )
            .bind(stock_id)
            .bind(provider)
            .bind(interval)
            .bind(&dates)
            .bind(column(|r| r.rsi))
            .bind(column(|r| r.macd))
            .bind(column(|r| r.macd_signal))
            .bind(column(|r| r.ema_20))
            .bind(column(|r| r.ema_50))
            .bind(column(|r| r.bb_upper))
            .bind(column(|r| r.bb_lower))
            .execute(&self.pool)
            .await
            .map_err(|e| DataError::InsertError(e.to_string()))?;

            written += result.rows_affected() as usize;
        }

        debug!(stock_id, provider, interval, written, "시그널 저장");
        Ok(written)
    }

    async fn list_signals(
        &self,
        stock_id: i64,
        provider: &str,
        interval: &str,
        limit: Option<i64>,
    ) -> Result<Vec<SignalRow>> {
        let records: Vec<SignalRecord> = sqlx::query_as(
            r#"
            SELECT as_of, rsi, macd, macd_signal, ema_20, ema_50, bb_upper, bb_lower
            FROM stock_signals
            WHERE stock_id = $1 AND provider = $2 AND interval = $3
            ORDER BY as_of DESC
            LIMIT $4
            "#,
        )
        .bind(stock_id)
        .bind(provider)
        .bind(interval)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut rows: Vec<SignalRow> = records.into_iter().map(SignalRow::from).collect();
        rows.reverse();
        Ok(rows)
    }

    async fn latest_signal(
        &self,
        stock_id: i64,
        provider: &str,
        interval: &str,
    ) -> Result<Option<SignalRow>> {
        let mut rows = self.list_signals(stock_id, provider, interval, Some(1)).await?;
        Ok(rows.pop())
    }
}

#[async_trait]
impl TemplateStore for PgStore {
    #[instrument(skip(self, new), fields(kind = %new.kind, name = %new.name, version = new.version))]
    async fn create_template(&self, new: NewTemplate) -> Result<StrategyTemplate> {
        let record: TemplateRecord = sqlx::query_as(
            r#"
            INSERT INTO strategy_templates (kind, name, version, description, config_json)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, kind, name, version, description, config_json, created_at
            "#,
        )
        .bind(new.kind.as_str())
        .bind(&new.name)
        .bind(new.version)
        .bind(&new.description)
        .bind(&new.config_json)
        .fetch_one(&self.pool)
        .await?;
        record.try_into()
    }

    async fn get_template(&self, id: i64) -> Result<Option<StrategyTemplate>> {
        let record: Option<TemplateRecord> = sqlx::query_as(
            r#"
            SELECT id, kind, name, version, description, config_json, created_at
            FROM strategy_templates
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        record.map(StrategyTemplate::try_from).transpose()
    }

    async fn list_templates(
        &self,
        kind: Option<TemplateKind>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<StrategyTemplate>> {
        let records: Vec<TemplateRecord> = sqlx::query_as(
            r#"
            SELECT id, kind, name, version, description, config_json, created_at
            FROM strategy_templates
            WHERE ($1::text IS NULL OR kind = $1)
            ORDER BY id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(kind.map(|k| k.as_str()))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        convert_all(records)
    }
}

#[async_trait]
impl CandidateStore for PgStore {
    #[instrument(skip(self, items), fields(count = items.len()))]
    async fn insert_candidates(&self, items: &[NewCandidate]) -> Result<Vec<TradeCandidate>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let universe_ids: Vec<i64> = items.iter().map(|c| c.universe_id).collect();
        let template_ids: Vec<i64> = items.iter().map(|c| c.template_id).collect();
        let tickers: Vec<String> = items.iter().map(|c| normalize_ticker(&c.ticker)).collect();
        let scores: Vec<f64> = items.iter().map(|c| c.score).collect();
        let statuses: Vec<&str> = items.iter().map(|c| c.status.as_str()).collect();
        let reasons: Vec<Option<String>> = items.iter().map(|c| c.reason_code.clone()).collect();
        let payloads: Vec<serde_json::Value> =
            items.iter().map(|c| c.payload_json.clone()).collect();

        // 단일 INSERT 문이므로 NOW()가 모든 행에 같은 값으로 들어감
        let records: Vec<CandidateRecord> = sqlx::query_as(
            r#"
            INSERT INTO trade_candidates
                (universe_id, template_id, ticker, score, status, reason_code, payload_json)
            SELECT * FROM UNNEST(
                $1::int8[], $2::int8[], $3::text[], $4::float8[], $5::text[], $6::text[],
                $7::jsonb[]
            )
            RETURNING id, universe_id, template_id, ticker, as_of, score, status,
                      reason_code, payload_json
            "#,
        )
        .bind(&universe_ids)
        .bind(&template_ids)
        .bind(&tickers)
        .bind(&scores)
        .bind(&statuses)
        .bind(&reasons)
        .bind(&payloads)
        .fetch_all(&self.pool)
        .await?;

        convert_all(records)
    }

    async fn list_candidates(
        &self,
        universe_id: i64,
        status: Option<CandidateStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TradeCandidate>> {
        let records: Vec<CandidateRecord> = sqlx::query_as(
            r#"
            SELECT id, universe_id, template_id, ticker, as_of, score, status,
                   reason_code, payload_json
            FROM trade_candidates
            WHERE universe_id = $1 AND ($2::text IS NULL OR status = $2)
            ORDER BY as_of DESC, score DESC, id ASC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(universe_id)
        .bind(status.map(|s| s.as_str()))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        convert_all(records)
    }

    async fn update_candidate_status(
        &self,
        id: i64,
        status: CandidateStatus,
        reason_code: Option<String>,
    ) -> Result<Option<TradeCandidate>> {
        let record: Option<CandidateRecord> = sqlx::query_as(
            r#"
            UPDATE trade_candidates
            SET status = $2, reason_code = $3
            WHERE id = $1
            RETURNING id, universe_id, template_id, ticker, as_of, score, status,
                      reason_code, payload_json
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(&reason_code)
        .fetch_optional(&self.pool)
        .await?;
        record.map(TradeCandidate::try_from).transpose()
    }
}

#[async_trait]
impl StoreHealth for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| DataError::QueryError(e.to_string()))?;
        Ok(())
    }
}
