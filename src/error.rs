use std::path::PathBuf;
use bitcoin::address::ParseError as BitcoinAddressError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/Oエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSONパースエラー ファイル: {file_path:?}, 詳細: {source}")]
    JsonParse {
        file_path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSONシリアライズエラー: {0}")]
    JsonSerialize(#[source] serde_json::Error),

    #[error("Bitcoinアドレスエラー: {0}")]
    BitcoinAddress(#[from] BitcoinAddressError),

    #[error("ネットワーク不整合: CLI指定 ({cli_network}) vs 設定ファイル ({config_network})")]
    NetworkMismatch {
        cli_network: String,
        config_network: String,
    },

    #[error("入力検証エラー: {0}")]
    InputValidation(String),

    // 集めた入力が支払額に届かない、または支払額が自身の手数料を賄えない
    #[error("残高不足: 利用可能額 {available} sats, 要求額 {required} sats (手数料 {fee} sats)")]
    InsufficientBalance {
        available: u64,
        required: u64,
        fee: u64,
    },

    #[error("金額の計算でオーバーフローが発生しました")]
    AmountOverflow,

    #[error("おつりアドレスの導出に失敗しました: {0}")]
    ChangeAddressDerivation(String),

    #[error("不明なスクリプトタイプ: {script_hex}")]
    UnknownScriptType { script_hex: String },

    // 呼び出し元の操作名を付けて外部コンポーネントのエラーをそのまま返す
    #[error("{op}: {source}")]
    Op {
        op: &'static str,
        #[source]
        source: Box<AppError>,
    },
}

impl AppError {
    pub fn with_op(self, op: &'static str) -> Self {
        AppError::Op {
            op,
            source: Box::new(self),
        }
    }

    pub fn is_insufficient_balance(&self) -> bool {
        match self {
            AppError::InsufficientBalance { .. } => true,
            AppError::Op { source, .. } => source.is_insufficient_balance(),
            _ => false,
        }
    }
}
