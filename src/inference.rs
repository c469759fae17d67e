use crate::cli::InferArgs;
use crate::domain::SampleMode;
use crate::model::{FeedForward, FeedForwardConfig};
use crate::problems::advection;
use burn::backend::{Autodiff, NdArray};
use burn::module::Module;
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder};
use burn::tensor::ElementConversion;
use std::time::Instant;

type MyBackend = NdArray<f32>;

/// `infer`サブコマンドを実行します。
///
/// 保存済みモデルを読み込み、移流問題の定義域を格子サンプリングして
/// 順伝播を実行します。
pub fn run(args: &InferArgs) -> Result<(), Box<dyn std::error::Error>> {
    let device = Default::default();

    if !args.model_path.exists() {
        return Err(format!(
            "モデルファイル '{}' が見つかりません。\n最初に 'train' コマンドでモデルを学習・保存してください。",
            args.model_path.display()
        )
        .into());
    }

    println!("\n推論を実行します - バックエンド: NdArray (CPU)");
    let inference_start = Instant::now();

    println!(
        "保存済みモデルを '{}' からロード中...",
        args.model_path.display()
    );
    // 問題の記述から入出力の幅と変数順を取り出す
    let problem = advection::problem::<Autodiff<NdArray<f32>>>();
    let model_config = FeedForwardConfig::new(
        problem.input_variables().len(),
        problem.output_variables().len(),
    )
    .with_hidden(args.hidden)
    .with_layers(args.layers);
    let model = match FeedForward::<MyBackend>::new(&model_config, &device).load_file(
        args.model_path.clone(),
        &NamedMpkFileRecorder::<FullPrecisionSettings>::new(),
        &device,
    ) {
        Ok(loaded_model) => loaded_model,
        Err(e) => return Err(Box::new(e)),
    };

    let mut rng = rand::rng();
    let points = advection::domain().sample(
        args.grid,
        SampleMode::Grid,
        problem.input_variables(),
        &mut rng,
    )?;
    let infer_coords = points.to_tensor::<MyBackend>(&device);
    let predictions = model.forward(infer_coords);
    let inference_duration = inference_start.elapsed();

    let u_min = predictions.clone().min().into_scalar().elem::<f32>();
    let u_max = predictions.clone().max().into_scalar().elem::<f32>();
    println!(
        "推論が完了しました。入力格子点数: {}, 出力テンソルの形状: {:?}, uの範囲: [{:.4}, {:.4}]",
        points.len(),
        predictions.dims(),
        u_min,
        u_max
    );
    println!("=> 推論時間: {:.2?}", inference_duration);

    Ok(())
}
