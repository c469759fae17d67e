use std::fmt;

/// このクレートの操作で発生しうるエラー。
#[derive(Debug, Clone, PartialEq)]
pub enum PinnError {
    /// サンプリング順序に、Spanが定義していない変数が含まれています。
    UnknownVariable { variable: String },
    /// 条件のSpanが、問題の入力変数を網羅していません。
    MissingVariable {
        condition: String,
        variable: String,
    },
    /// 区間の下限が上限以上になっています。
    InvalidInterval {
        variable: String,
        lo: f32,
        hi: f32,
    },
    /// サンプリング点数に0が指定されました。
    InvalidPointCount,
    /// 条件の点群がサンプリングされないまま学習が開始されました。
    NotSampled { condition: String },
    /// 条件が1つもない問題で学習が開始されました。
    NoConditions,
}

impl fmt::Display for PinnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownVariable { variable } => {
                write!(f, "変数 '{}' はこのSpanで定義されていません。", variable)
            }
            Self::MissingVariable {
                condition,
                variable,
            } => write!(
                f,
                "条件 '{}' のSpanに入力変数 '{}' がありません。",
                condition, variable
            ),
            Self::InvalidInterval { variable, lo, hi } => write!(
                f,
                "変数 '{}' の区間 [{}, {}] が不正です（下限 < 上限 が必要です）。",
                variable, lo, hi
            ),
            Self::InvalidPointCount => {
                write!(f, "サンプリング点数には1以上を指定してください。")
            }
            Self::NotSampled { condition } => write!(
                f,
                "条件 '{}' の点群が未サンプリングです。先に sample を呼んでください。",
                condition
            ),
            Self::NoConditions => {
                write!(f, "問題に条件が1つも定義されていません。")
            }
        }
    }
}

impl std::error::Error for PinnError {}
