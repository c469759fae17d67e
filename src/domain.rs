//! 問題の定義域（Span）と選点のサンプリング。
//!
//! 変数ごとの区間（または固定値）の集まりとしてSpanを定義し、
//! 格子・ラテン超方格・一様乱数のいずれかの戦略で選点（コロケーション点）を
//! 生成します。生成結果はCPU側の行優先バッファで、`to_tensor`でバックエンドの
//! テンソルに変換します。

use crate::error::PinnError;
use burn::prelude::Backend;
use burn::tensor::Tensor;
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::BTreeMap;

/// 1変数分の定義域。区間または単一の固定値です。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpanRange {
    /// 固定値（境界面など、退化した次元）
    Fixed(f32),
    /// 閉区間 [lo, hi]
    Interval(f32, f32),
}

/// 選点のサンプリング戦略。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleMode {
    /// 区間変数ごとにn点の等間隔格子（直積）
    Grid,
    /// ラテン超方格（各次元をn層に分割し、層ごとに1点）
    LatinHypercube,
    /// 一様乱数
    Random,
}

/// 変数名をキーとする定義域。構築後は不変です。
#[derive(Debug, Clone, Default)]
pub struct Span {
    ranges: BTreeMap<String, SpanRange>,
}

impl Span {
    /// 空のSpanを作成します。
    pub fn new() -> Self {
        Self::default()
    }

    /// 区間変数を追加します。
    pub fn interval(mut self, variable: &str, lo: f32, hi: f32) -> Self {
        self.ranges
            .insert(variable.to_string(), SpanRange::Interval(lo, hi));
        self
    }

    /// 固定値の変数を追加します。
    pub fn fixed(mut self, variable: &str, value: f32) -> Self {
        self.ranges
            .insert(variable.to_string(), SpanRange::Fixed(value));
        self
    }

    /// 変数の定義域を返します。
    pub fn range(&self, variable: &str) -> Option<&SpanRange> {
        self.ranges.get(variable)
    }

    /// 定義済みの変数名を辞書順で返します。
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.ranges.keys().map(String::as_str)
    }

    /// 指定の変数順で選点を生成します。
    ///
    /// 生成される行数は、`Grid`では区間変数1つあたりn点の直積
    /// （n^(区間変数の数)）、それ以外ではnです。固定値の変数は
    /// 全行で定数となります。
    pub fn sample<R: Rng>(
        &self,
        n: usize,
        mode: SampleMode,
        order: &[String],
        rng: &mut R,
    ) -> Result<SampledPoints, PinnError> {
        if n == 0 {
            return Err(PinnError::InvalidPointCount);
        }
        let ranges = order
            .iter()
            .map(|variable| {
                let range = self
                    .ranges
                    .get(variable)
                    .ok_or_else(|| PinnError::UnknownVariable {
                        variable: variable.clone(),
                    })?;
                if let SpanRange::Interval(lo, hi) = range {
                    if lo >= hi {
                        return Err(PinnError::InvalidInterval {
                            variable: variable.clone(),
                            lo: *lo,
                            hi: *hi,
                        });
                    }
                }
                Ok(*range)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let n_free = ranges
            .iter()
            .filter(|r| matches!(r, SpanRange::Interval(_, _)))
            .count();
        let rows = match mode {
            SampleMode::Grid => n.pow(n_free as u32),
            SampleMode::LatinHypercube | SampleMode::Random => n,
        };

        // 変数ごとに列を生成してから行優先に並べ替える
        let mut columns: Vec<Vec<f32>> = Vec::with_capacity(ranges.len());
        let mut free_seen = 0;
        for range in &ranges {
            let column = match range {
                SpanRange::Fixed(value) => vec![*value; rows],
                SpanRange::Interval(lo, hi) => {
                    let column = match mode {
                        SampleMode::Grid => grid_column(n, n_free, free_seen, *lo, *hi),
                        SampleMode::LatinHypercube => latin_column(n, *lo, *hi, rng),
                        SampleMode::Random => {
                            (0..n).map(|_| rng.random_range(*lo..*hi)).collect()
                        }
                    };
                    free_seen += 1;
                    column
                }
            };
            columns.push(column);
        }

        let cols = ranges.len();
        let mut data = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for column in &columns {
                data.push(column[row]);
            }
        }
        Ok(SampledPoints { data, rows, cols })
    }
}

/// 格子モードの1列分。free_index番目の区間変数がn^(n_free-1-free_index)行ごとに
/// 1目盛り進むように直積を展開します。
fn grid_column(n: usize, n_free: usize, free_index: usize, lo: f32, hi: f32) -> Vec<f32> {
    let stride = n.pow((n_free - 1 - free_index) as u32);
    let rows = n.pow(n_free as u32);
    (0..rows)
        .map(|row| {
            let idx = (row / stride) % n;
            if n == 1 {
                (lo + hi) / 2.0
            } else {
                lo + idx as f32 * (hi - lo) / (n - 1) as f32
            }
        })
        .collect()
}

/// ラテン超方格の1列分。[0,1)をn層に分割して層ごとに1点を取り、層の順序を
/// シャッフルします。
fn latin_column<R: Rng>(n: usize, lo: f32, hi: f32, rng: &mut R) -> Vec<f32> {
    let mut column: Vec<f32> = (0..n)
        .map(|i| {
            let u = (i as f32 + rng.random::<f32>()) / n as f32;
            lo + u * (hi - lo)
        })
        .collect();
    column.shuffle(rng);
    column
}

/// サンプリング済みの選点。行優先のCPUバッファです。
#[derive(Debug, Clone)]
pub struct SampledPoints {
    data: Vec<f32>,
    rows: usize,
    cols: usize,
}

impl SampledPoints {
    /// 点の数（行数）を返します。
    pub fn len(&self) -> usize {
        self.rows
    }

    /// 点が1つもない場合にtrueを返します。
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// 座標の次元数（列数）を返します。
    pub fn dims(&self) -> usize {
        self.cols
    }

    /// 行優先のバッファへの参照を返します。
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// バックエンド上の2階テンソル [rows, cols] に変換します。
    pub fn to_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 2> {
        Tensor::<B, 1>::from_floats(self.data.as_slice(), device).reshape([self.rows, self.cols])
    }
}
