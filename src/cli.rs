use crate::domain::SampleMode;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// clapでコマンドラインの構造を定義します。
#[derive(Parser, Debug)]
#[command(author, version, about = "A Physics-Informed Neural Network (PINN) workbench with Burn", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 実行するサブコマンドを定義します（train または infer）。
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// PINNモデルを学習し、結果をファイルに保存します
    Train(TrainArgs),
    /// 保存されたPINNモデルを使い、推論を実行します
    Infer(InferArgs),
}

/// コマンドラインから選べるサンプリング戦略。
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum SampleModeArg {
    /// 等間隔格子（区間変数の直積）
    Grid,
    /// ラテン超方格
    LatinHypercube,
    /// 一様乱数
    Random,
}

impl From<SampleModeArg> for SampleMode {
    fn from(mode: SampleModeArg) -> Self {
        match mode {
            SampleModeArg::Grid => SampleMode::Grid,
            SampleModeArg::LatinHypercube => SampleMode::LatinHypercube,
            SampleModeArg::Random => SampleMode::Random,
        }
    }
}

/// `train`サブコマンドの引数。
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// 最大エポック数
    #[arg(long, default_value_t = 8000)]
    pub epochs: usize,

    /// 学習率
    #[arg(long, default_value_t = 1e-3)]
    pub learning_rate: f64,

    /// 条件ごとのサンプリング点数（Gridでは区間変数1つあたりの点数）
    #[arg(long, default_value_t = 1000)]
    pub points: usize,

    /// サンプリング戦略
    #[arg(long, value_enum, default_value_t = SampleModeArg::Random)]
    pub mode: SampleModeArg,

    /// 損失を表示するエポック間隔（0なら表示しない）
    #[arg(long, default_value_t = 200)]
    pub print_every: usize,

    /// 合計損失がこの値を下回ったら学習を打ち切ります
    #[arg(long)]
    pub loss_target: Option<f32>,

    /// 隠れ層のユニット数
    #[arg(long, default_value_t = 20)]
    pub hidden: usize,

    /// 層数（入出力層を含む）
    #[arg(long, default_value_t = 4)]
    pub layers: usize,

    /// モデルの保存先
    #[arg(long, default_value = crate::MODEL_FILENAME)]
    pub model_path: PathBuf,

    /// 損失グラフの保存先
    #[arg(long, default_value = crate::LOSS_GRAPH_FILENAME)]
    pub plot_path: PathBuf,
}

/// `infer`サブコマンドの引数。
#[derive(Args, Debug)]
pub struct InferArgs {
    /// モデルの読み込み元
    #[arg(long, default_value = crate::MODEL_FILENAME)]
    pub model_path: PathBuf,

    /// 推論格子の区間変数1つあたりの点数
    #[arg(long, default_value_t = 50)]
    pub grid: usize,

    /// 学習時と同じ隠れ層のユニット数
    #[arg(long, default_value_t = 20)]
    pub hidden: usize,

    /// 学習時と同じ層数
    #[arg(long, default_value_t = 4)]
    pub layers: usize,
}
