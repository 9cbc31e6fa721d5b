//! Embedded, idempotent schema bootstrap.
//!
//! Everything is `IF NOT EXISTS` / `INSERT OR IGNORE`, so running this on
//! every startup is safe.

use anyhow::Result;
use sqlx::SqlitePool;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS competitions (
    id                   TEXT PRIMARY KEY,
    title                TEXT NOT NULL,
    url                  TEXT NOT NULL,
    status               TEXT NOT NULL CHECK (status IN ('active', 'completed', 'upcoming')),
    start_date           TEXT,
    end_date             TEXT,
    metric               TEXT,
    metric_description   TEXT,
    description          TEXT,
    summary              TEXT,
    tags                 TEXT,
    data_types           TEXT,
    task_types           TEXT,
    competition_features TEXT,
    domain               TEXT,
    dataset_info         TEXT,
    discussion_count     INTEGER NOT NULL DEFAULT 0,
    solution_status      TEXT NOT NULL DEFAULT '未着手',
    is_favorite          INTEGER NOT NULL DEFAULT 0,
    created_at           TEXT,
    last_scraped_at      TEXT
);

CREATE TABLE IF NOT EXISTS discussions (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    competition_id TEXT NOT NULL REFERENCES competitions(id),
    title          TEXT NOT NULL,
    url            TEXT NOT NULL,
    author         TEXT NOT NULL,
    author_tier    TEXT,
    tier_color     TEXT,
    vote_count     INTEGER NOT NULL DEFAULT 0,
    comment_count  INTEGER NOT NULL DEFAULT 0,
    category       TEXT NOT NULL CHECK (category IN ('discussion', 'writeup')),
    is_pinned      INTEGER NOT NULL DEFAULT 0,
    summary        TEXT,
    created_at     TEXT,
    updated_at     TEXT,
    UNIQUE (competition_id, url)
);

CREATE TABLE IF NOT EXISTS solutions (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    competition_id TEXT NOT NULL REFERENCES competitions(id),
    title          TEXT NOT NULL,
    url            TEXT NOT NULL,
    author         TEXT NOT NULL,
    author_tier    TEXT,
    tier_color     TEXT,
    type           TEXT NOT NULL CHECK (type IN ('notebook', 'discussion')),
    medal          TEXT CHECK (medal IN ('gold', 'silver', 'bronze')),
    rank           INTEGER,
    vote_count     INTEGER NOT NULL DEFAULT 0,
    comment_count  INTEGER NOT NULL DEFAULT 0,
    summary        TEXT,
    techniques     TEXT,
    created_at     TEXT,
    updated_at     TEXT,
    UNIQUE (competition_id, url)
);

CREATE TABLE IF NOT EXISTS tags (
    name          TEXT NOT NULL,
    category      TEXT NOT NULL CHECK (category IN (
        'data_type', 'task_type', 'model_type',
        'solution_method', 'competition_feature', 'domain')),
    display_order INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (name, category)
);

CREATE INDEX IF NOT EXISTS idx_competitions_status      ON competitions(status);
CREATE INDEX IF NOT EXISTS idx_competitions_end_date    ON competitions(end_date);
CREATE INDEX IF NOT EXISTS idx_competitions_created_at  ON competitions(created_at);
CREATE INDEX IF NOT EXISTS idx_competitions_is_favorite ON competitions(is_favorite);
CREATE INDEX IF NOT EXISTS idx_discussions_competition  ON discussions(competition_id);
CREATE INDEX IF NOT EXISTS idx_discussions_votes        ON discussions(vote_count DESC);
CREATE INDEX IF NOT EXISTS idx_solutions_competition    ON solutions(competition_id);
CREATE INDEX IF NOT EXISTS idx_solutions_rank           ON solutions(rank ASC);
CREATE INDEX IF NOT EXISTS idx_solutions_votes          ON solutions(vote_count DESC);
"#;

/// The static tag taxonomy, seeded at bootstrap. `(category, names)`;
/// display order follows list position.
const TAG_SEED: &[(&str, &[&str])] = &[
    (
        "data_type",
        &["テーブル", "画像", "テキスト", "音声", "動画", "時系列", "地理空間"],
    ),
    (
        "task_type",
        &[
            "分類（二値）",
            "分類（多クラス）",
            "回帰",
            "ランキング",
            "物体検出",
            "セグメンテーション",
            "生成",
            "クラスタリング",
        ],
    ),
    (
        "model_type",
        &[
            "勾配ブースティング",
            "ニューラルネットワーク",
            "CNN",
            "Transformer",
            "線形モデル",
            "アンサンブル",
        ],
    ),
    (
        "solution_method",
        &[
            "特徴量エンジニアリング",
            "データ拡張",
            "アンサンブル学習",
            "転移学習",
            "擬似ラベリング",
            "クロスバリデーション",
        ],
    ),
    (
        "competition_feature",
        &[
            "不均衡データ",
            "欠損値多い",
            "外れ値対策必要",
            "大規模データ",
            "小規模データ",
            "リーク対策必要",
            "時系列考慮",
            "ドメイン知識重要",
            "データ品質課題",
        ],
    ),
    (
        "domain",
        &[
            "医療",
            "金融",
            "Eコマース",
            "自然言語処理",
            "コンピュータビジョン",
            "音声認識",
            "推薦システム",
            "時系列予測",
            "その他",
        ],
    ),
];

pub async fn run(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA.split(';') {
        let statement = statement.trim();
        if statement.is_empty() {
            continue;
        }
        sqlx::query(statement).execute(pool).await?;
    }

    seed_tags(pool).await
}

async fn seed_tags(pool: &SqlitePool) -> Result<()> {
    for (category, names) in TAG_SEED {
        for (i, name) in names.iter().enumerate() {
            sqlx::query(
                "INSERT OR IGNORE INTO tags (name, category, display_order) VALUES (?, ?, ?)",
            )
            .bind(name)
            .bind(category)
            .bind((i + 1) as i64)
            .execute(pool)
            .await?;
        }
    }
    Ok(())
}
