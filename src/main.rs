//! # 物理情報ニューラルネットワーク (PINN) ワークベンチ
//!
//! `burn` フレームワークを使用して、物理情報ニューラルネットワーク（PINN）を
//! 構築し、1次元の移流方程式を解くワークベンチです。
//!
//! `clap` クレートを利用して、コマンドラインから`train`（学習）と`infer`（推論）の
//! 機能を個別に実行できます。
//!
//! ## 使い方
//!
//! ### 学習
//! ```bash
//! cargo run --release -- train
//! ```
//!
//! ### 推論
//! ```bash
//! cargo run --release -- infer
//! ```

use clap::Parser;
use pinn_lab::cli::{Cli, Commands};
use pinn_lab::{inference, training};

/// プログラムのエントリーポイント。
///
/// コマンドライン引数を解析し、`train`または`infer`の処理に振り分けます。
fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Train(args) => training::run(args),
        Commands::Infer(args) => inference::run(args),
    };

    if let Err(e) = result {
        eprintln!("エラー: {}", e);
        std::process::exit(1);
    }
}
