//! 学習ループ。
//!
//! 条件ごとに残差を評価してMSEで0に近づけ、条件別損失の合計を
//! Adamで最小化します。学習中のモデルパラメータはTrainerが専有します。

use crate::cli::TrainArgs;
use crate::domain::SampleMode;
use crate::error::PinnError;
use crate::history::LossRecord;
use crate::model::{FeedForward, FeedForwardConfig};
use crate::ops;
use crate::problem::Problem;
use crate::problems::advection;
use burn::backend::{Autodiff, NdArray};
use burn::module::Module;
use burn::nn::loss::{MseLoss, Reduction};
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder};
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::{ElementConversion, Tensor};
use rand::Rng;
use std::collections::BTreeMap;
use std::time::Instant;

type MyBackend = Autodiff<NdArray<f32>>;

/// 学習ループの設定。
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// 最大エポック数
    pub epochs: usize,
    /// 学習率
    pub learning_rate: f64,
    /// 損失を表示するエポック間隔（0なら表示しない）
    pub print_every: usize,
    /// 合計損失がこの値を下回ったら学習を打ち切ります
    pub loss_target: Option<f32>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            epochs: 8000,
            learning_rate: 1e-3,
            print_every: 200,
            loss_target: None,
        }
    }
}

/// 学習の結果。学習済みモデルと損失履歴を返します。
#[derive(Debug)]
pub struct TrainOutcome<B: AutodiffBackend> {
    pub model: FeedForward<B>,
    pub history: LossRecord,
}

/// 問題・モデル・条件ごとの点群を束ねて学習を進めるトレーナ。
pub struct Trainer<B: AutodiffBackend> {
    problem: Problem<B>,
    model: FeedForward<B>,
    points: BTreeMap<String, Tensor<B, 2>>,
    device: B::Device,
}

impl<B: AutodiffBackend> Trainer<B> {
    /// 問題とモデルからトレーナを作成します。
    pub fn new(problem: Problem<B>, model: FeedForward<B>, device: B::Device) -> Self {
        Self {
            problem,
            model,
            points: BTreeMap::new(),
            device,
        }
    }

    /// 全条件の点群をサンプリングし直します。
    pub fn sample_points<R: Rng>(
        &mut self,
        n: usize,
        mode: SampleMode,
        rng: &mut R,
    ) -> Result<(), PinnError> {
        let sampled = self.problem.sample(n, mode, rng)?;
        self.points = sampled
            .iter()
            .map(|(name, points)| (name.clone(), points.to_tensor::<B>(&self.device)))
            .collect();
        Ok(())
    }

    /// 学習ループを実行します。
    ///
    /// 各エポックで、条件を名前順に走査して残差を評価し、残差のMSEを
    /// 条件別損失として合算、合計損失を逆伝播してAdamで1ステップ進めます。
    /// 損失は毎エポック履歴に追記されます。
    pub fn fit(mut self, config: &TrainConfig) -> Result<TrainOutcome<B>, PinnError> {
        if self.problem.conditions().is_empty() {
            return Err(PinnError::NoConditions);
        }
        for name in self.problem.condition_names() {
            if !self.points.contains_key(&name) {
                return Err(PinnError::NotSampled { condition: name });
            }
        }

        let condition_names = self.problem.condition_names();
        let n_outputs = self.problem.output_variables().len();
        let mut optim = AdamConfig::new().init();
        let mut history = LossRecord::new(condition_names.clone());

        for epoch in 1..=config.epochs {
            let mut per_condition = Vec::with_capacity(condition_names.len());
            let mut total_loss: Option<Tensor<B, 1>> = None;
            for (name, condition) in self.problem.conditions() {
                let coords = self.points[name].clone();
                let sample = ops::field_sample(&self.model, coords, n_outputs);
                let mut condition_loss: Option<Tensor<B, 1>> = None;
                for residual_fn in condition.residuals() {
                    let residual = residual_fn(&sample);
                    let loss = MseLoss::new().forward(
                        residual.clone(),
                        Tensor::zeros_like(&residual),
                        Reduction::Mean,
                    );
                    condition_loss = Some(match condition_loss {
                        Some(acc) => acc + loss,
                        None => loss,
                    });
                }
                let condition_loss = condition_loss.expect("条件は残差関数を1つ以上持ちます");
                per_condition.push(condition_loss.clone().into_scalar().elem::<f32>());
                total_loss = Some(match total_loss {
                    Some(acc) => acc + condition_loss,
                    None => condition_loss,
                });
            }
            let total_loss = total_loss.expect("条件の有無は確認済みです");
            let total_val = total_loss.clone().into_scalar().elem::<f32>();
            history.append(epoch, total_val, &per_condition);

            if config.print_every > 0 && epoch % config.print_every == 0 {
                let detail: String = condition_names
                    .iter()
                    .zip(&per_condition)
                    .map(|(name, val)| format!(", {}: {:.6}", name, val))
                    .collect();
                println!("[Epoch {}] Total Loss: {:.6}{}", epoch, total_val, detail);
            }

            let grads = total_loss.backward();
            let grads = GradientsParams::from_grads(grads, &self.model);
            self.model = optim.step(config.learning_rate, self.model, grads);

            if let Some(target) = config.loss_target {
                if total_val < target {
                    println!(
                        "[Epoch {}] 合計損失が目標値 {:.6} を下回ったため打ち切ります。",
                        epoch, target
                    );
                    break;
                }
            }
        }

        Ok(TrainOutcome {
            model: self.model,
            history,
        })
    }
}

/// `train`サブコマンドを実行します。
pub fn run(args: &TrainArgs) -> Result<(), Box<dyn std::error::Error>> {
    let device = Default::default();

    // --- 問題・モデル・点群の準備 ---
    let problem = advection::problem::<MyBackend>();
    let model_config = FeedForwardConfig::new(
        problem.input_variables().len(),
        problem.output_variables().len(),
    )
    .with_hidden(args.hidden)
    .with_layers(args.layers);
    let model = FeedForward::<MyBackend>::new(&model_config, &device);
    let mut trainer = Trainer::new(problem, model, device);
    let mut rng = rand::rng();
    trainer.sample_points(args.points, args.mode.into(), &mut rng)?;

    println!(
        "学習を開始します (移流方程式) - バックエンド: NdArray (CPU), サンプリング: {:?}",
        args.mode
    );

    // --- 学習ループ ---
    let train_config = TrainConfig {
        epochs: args.epochs,
        learning_rate: args.learning_rate,
        print_every: args.print_every,
        loss_target: args.loss_target,
    };
    let training_start = Instant::now();
    let outcome = trainer.fit(&train_config)?;
    let training_duration = training_start.elapsed();
    println!("学習が完了しました。");
    println!("=> 学習時間: {:.2?}", training_duration);

    // --- 結果の保存と描画 ---
    outcome.history.plot(&args.plot_path)?;
    println!(
        "=> 損失グラフを '{}' に保存しました。",
        args.plot_path.display()
    );

    println!("学習済みモデルを保存中...");
    match outcome.model.save_file(
        args.model_path.clone(),
        &NamedMpkFileRecorder::<FullPrecisionSettings>::new(),
    ) {
        Ok(_) => (),
        Err(e) => return Err(Box::new(e)),
    };
    println!(
        "=> モデルを '{}' に保存しました。",
        args.model_path.display()
    );

    Ok(())
}
