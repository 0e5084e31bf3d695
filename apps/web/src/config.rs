//! # Web サーバー設定
//!
//! 環境変数から Web サーバーの設定を読み込む。
//!
//! | 変数 | デフォルト | 説明 |
//! |------|-----------|------|
//! | `WEB_HOST` | `0.0.0.0` | バインドアドレス |
//! | `WEB_PORT` | `8080` | ポート番号 |
//! | `STORE_BACKEND` | `postgres` | `postgres` / `memory` |
//! | `DATABASE_URL` | なし | `postgres` の場合は必須 |
//! | `LISTING_DELAY_MS` | `1000` | `/listar-datadriver` の要素ごとの遅延 |
//! | `LISTING_BUFFER_SIZE` | `1` | データ駆動レンダリングのバッチサイズ |
//! | `LISTING_REPEAT` | `5000` | 繰り返し一覧の追加繰り返し回数 |
//! | `CHUNK_SIZE_BYTES` | `1024` | チャンクレンダリングの最大チャンクサイズ |
//! | `CHUNKED_VIEWS` | `listar-chunked` | チャンクレンダリングするビュー名（カンマ区切り） |

use std::{env, str::FromStr, time::Duration};

use strum::{Display, EnumString};
use thiserror::Error;

/// 設定読み込みエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} が設定されていません")]
    Missing { name: &'static str },

    #[error("{name} の値が不正です: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// 商品ストアの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

/// 商品ストアの接続設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Postgres { database_url: String },
    Memory,
}

impl StoreConfig {
    pub fn backend(&self) -> StoreBackend {
        match self {
            Self::Postgres { .. } => StoreBackend::Postgres,
            Self::Memory => StoreBackend::Memory,
        }
    }
}

/// 一覧表示の設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingConfig {
    /// データ駆動一覧で要素ごとに挟む遅延
    pub delay:       Duration,
    /// データ駆動レンダリングで1回に描画する要素数（1 以上）
    pub buffer_size: usize,
    /// 繰り返し一覧の追加繰り返し回数
    pub repeat:      usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            delay:       Duration::from_millis(1000),
            buffer_size: 1,
            repeat:      5000,
        }
    }
}

/// ビューレンダリングの設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// チャンクレンダリングの最大チャンクサイズ（バイト、1 以上）
    pub max_chunk_size: usize,
    /// チャンクレンダリングを適用するビュー名
    pub chunked_views:  Vec<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: 1024,
            chunked_views:  vec!["listar-chunked".to_string()],
        }
    }
}

/// Web サーバーの設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebConfig {
    pub host:    String,
    pub port:    u16,
    pub store:   StoreConfig,
    pub listing: ListingConfig,
    pub render:  RenderConfig,
}

impl WebConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の参照関数から設定を読み込む
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let listing_defaults = ListingConfig::default();
        let render_defaults = RenderConfig::default();

        let backend: StoreBackend = parse_or(&lookup, "STORE_BACKEND", StoreBackend::Postgres)?;
        let store = match backend {
            StoreBackend::Postgres => StoreConfig::Postgres {
                database_url: lookup("DATABASE_URL")
                    .filter(|v| !v.trim().is_empty())
                    .ok_or(ConfigError::Missing {
                        name: "DATABASE_URL",
                    })?,
            },
            StoreBackend::Memory => StoreConfig::Memory,
        };

        let delay_ms: u64 = parse_or(
            &lookup,
            "LISTING_DELAY_MS",
            listing_defaults.delay.as_millis() as u64,
        )?;

        Ok(Self {
            host: lookup("WEB_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "WEB_PORT", 8080)?,
            store,
            listing: ListingConfig {
                delay:       Duration::from_millis(delay_ms),
                buffer_size: positive_or(&lookup, "LISTING_BUFFER_SIZE", listing_defaults.buffer_size)?,
                repeat:      parse_or(&lookup, "LISTING_REPEAT", listing_defaults.repeat)?,
            },
            render: RenderConfig {
                max_chunk_size: positive_or(&lookup, "CHUNK_SIZE_BYTES", render_defaults.max_chunk_size)?,
                chunked_views:  lookup("CHUNKED_VIEWS")
                    .map(|v| parse_list(&v))
                    .unwrap_or(render_defaults.chunked_views),
            },
        })
    }
}

/// 値が未設定ならデフォルト値、設定済みならパースした値を返す
fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

/// 1 以上であることを要求する [`parse_or`]
fn positive_or(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: usize,
) -> Result<usize, ConfigError> {
    let value = parse_or(lookup, name, default)?;
    if value == 0 {
        return Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
        });
    }
    Ok(value)
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_memoryバックエンドは未設定の値にデフォルトを使う() {
        let sut = WebConfig::from_lookup(lookup_from(&[("STORE_BACKEND", "memory")])).unwrap();

        assert_eq!(
            sut,
            WebConfig {
                host:    "0.0.0.0".to_string(),
                port:    8080,
                store:   StoreConfig::Memory,
                listing: ListingConfig::default(),
                render:  RenderConfig::default(),
            }
        );
    }

    #[test]
    fn test_postgresバックエンドはdatabase_urlを要求する() {
        let result = WebConfig::from_lookup(lookup_from(&[]));

        assert_eq!(
            result,
            Err(ConfigError::Missing {
                name: "DATABASE_URL",
            })
        );
    }

    #[test]
    fn test_全ての値を環境変数から読み込む() {
        let sut = WebConfig::from_lookup(lookup_from(&[
            ("WEB_HOST", "127.0.0.1"),
            ("WEB_PORT", "3000"),
            ("STORE_BACKEND", "Postgres"),
            ("DATABASE_URL", "postgres://localhost/catalog"),
            ("LISTING_DELAY_MS", "250"),
            ("LISTING_BUFFER_SIZE", "2"),
            ("LISTING_REPEAT", "10"),
            ("CHUNK_SIZE_BYTES", "512"),
            ("CHUNKED_VIEWS", "listar-chunked, listar-full ,"),
        ]))
        .unwrap();

        assert_eq!(sut.host, "127.0.0.1");
        assert_eq!(sut.port, 3000);
        assert_eq!(
            sut.store,
            StoreConfig::Postgres {
                database_url: "postgres://localhost/catalog".to_string(),
            }
        );
        assert_eq!(sut.store.backend(), StoreBackend::Postgres);
        assert_eq!(
            sut.listing,
            ListingConfig {
                delay:       Duration::from_millis(250),
                buffer_size: 2,
                repeat:      10,
            }
        );
        assert_eq!(sut.render.max_chunk_size, 512);
        assert_eq!(sut.render.chunked_views, vec!["listar-chunked", "listar-full"]);
    }

    #[rstest]
    #[case("STORE_BACKEND", "mongodb")]
    #[case("WEB_PORT", "http")]
    #[case("LISTING_BUFFER_SIZE", "0")]
    #[case("CHUNK_SIZE_BYTES", "-1")]
    #[case("LISTING_DELAY_MS", "1s")]
    fn test_不正な値は設定エラーになる(#[case] name: &'static str, #[case] value: &str) {
        let result = WebConfig::from_lookup(lookup_from(&[
            ("STORE_BACKEND", "memory"),
            (name, value),
        ]));

        assert_eq!(
            result,
            Err(ConfigError::Invalid {
                name,
                value: value.to_string(),
            })
        );
    }
}
