//! # 物理情報ニューラルネットワーク (PINN) ワークベンチ
//!
//! `burn` フレームワークの上に、PINN学習のワークフロー一式を提供します。
//! 問題の記述（出力変数・定義域・名前付き条件）、選点のサンプリング
//! （格子・ラテン超方格・一様乱数）、条件別の残差損失を合算する学習ループ、
//! 損失履歴の記録とグラフ出力までを扱います。
//!
//! 同梱のデモ問題は1次元の移流方程式です。

pub mod cli;
pub mod domain;
pub mod error;
pub mod history;
pub mod inference;
pub mod model;
pub mod ops;
pub mod problem;
pub mod problems;
pub mod training;

/// モデルを保存するファイル名
pub const MODEL_FILENAME: &str = "pinn_model.mpk";

/// 損失グラフを保存するファイル名
pub const LOSS_GRAPH_FILENAME: &str = "loss_graph.png";
