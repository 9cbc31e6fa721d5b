//! Prompt templates for the enrichment operations.
//!
//! These are configuration, not logic: wording can be tuned freely as long
//! as each prompt keeps requesting the exact output shape its parser
//! expects (see `schemas.rs`). Study-note output is Japanese, matching the
//! catalog's audience.

pub const ANALYST_SYSTEM: &str =
    "あなたはKaggleコンペティションの分析専門家です。";
pub const ANALYST_JSON_SYSTEM: &str =
    "あなたはKaggleコンペティションの分析専門家です。JSON形式で回答してください。";
pub const SUMMARIZER_SYSTEM: &str =
    "あなたはKaggleディスカッションの要約専門家です。";
pub const TRANSLATOR_SYSTEM: &str =
    "あなたは機械学習に詳しい技術翻訳者です。";

/// Section separator for `translate_and_organize` output.
pub const SECTION_SEPARATOR: &str = "━━━";

pub fn extract_metric(description: &str, title: &str) -> String {
    format!(
        "以下のコンペティション説明文から評価指標（Evaluation Metric）の名前を抽出してください。\n\n\
         【タイトル】\n{title}\n\n\
         【説明文】\n{description}\n\n\
         【注意事項】\n\
         - 評価指標の名前のみを返す（前置きや説明は不要）\n\
         - 説明文に明示的に記載されている場合のみ抽出し、推測はしない\n\
         - 記載がない、または不明確な場合は空文字列を返す\n\
         - 30文字以内で簡潔に"
    )
}

pub fn describe_metric(metric: &str, description: &str, title: &str) -> String {
    format!(
        "以下のコンペティションで使用される評価指標について、初心者にも分かる説明を作成してください。\n\n\
         【タイトル】\n{title}\n\n\
         【評価指標】\n{metric}\n\n\
         【説明文】\n{description}\n\n\
         【要件】\n\
         - 指標の意味、何を測定するか、なぜこのコンペで使われるかを含める\n\
         - 前置きや見出しは不要、説明文のみ\n\
         - 100-150文字程度"
    )
}

pub fn generate_summary(description: &str, title: &str, metric: &str) -> String {
    format!(
        "以下のコンペティション情報を分析し、構造化された日本語要約をJSONで出力してください。\n\n\
         【タイトル】\n{title}\n\n\
         【評価指標】\n{metric}\n\n\
         【説明文】\n{description}\n\n\
         【出力フィールド】\n\
         - overview: コンペの概要を1-2文で（50-100文字）\n\
         - objective: 何を予測/分類/生成するか（30-50文字）\n\
         - data: 使用するデータの種類（30-50文字）\n\
         - evaluation: {{metric, explanation, why_important}} 評価指標とその説明\n\
         - business_value: ビジネス上の価値や目的（50-80文字）\n\
         - key_challenges: 技術的な課題を3-5個の配列で\n\n\
         技術用語は適切に日本語化し、JSONのみを出力してください。"
    )
}

pub fn generate_tags(description: &str, title: &str, metric: &str, taxonomy_json: &str) -> String {
    format!(
        "以下のコンペティション情報を分析し、利用可能なタグから適切なものを選択してJSONで出力してください。\n\n\
         【タイトル】\n{title}\n\n\
         【評価指標】\n{metric}\n\n\
         【説明文】\n{description}\n\n\
         【利用可能なタグ】\n{taxonomy_json}\n\n\
         【出力フィールド】\n\
         - data_types: 該当するデータ種別（1-2個）\n\
         - tags: task_typeを必ず1-2個含め、合計3-5個程度\n\
         - domain: 最も関連性の高いドメイン1つ\n\n\
         【厳守事項】\n\
         - 説明文に明示されている情報のみ選択し、推測は一切禁止\n\
         - 必ず利用可能なタグリストから選択\n\
         - 確信が持てない場合は空配列・空文字列を恐れない"
    )
}

pub fn extract_dataset_info(data_text: &str, title: &str) -> String {
    format!(
        "以下のDataタブの内容からデータセット情報を抽出し、JSONで出力してください。\n\n\
         【タイトル】\n{title}\n\n\
         【Dataタブのテキスト】\n{data_text}\n\n\
         【出力フィールド】\n\
         - files: データファイル名のリスト（主要なもののみ、最大10個）\n\
         - total_size: データセット全体のサイズ（明記されている場合のみ）\n\
         - description: データの概要を日本語で（150-200文字程度）\n\
         - features: 主要な特徴量・カラム名のリスト（最大15個）\n\
         - columns: {{name, description}} の配列（カラム名は英語のまま、説明は日本語、最大20個）\n\n\
         テキストに明記されている情報のみを抽出し、不明な項目は空にしてください。"
    )
}

pub fn summarize_discussion(content: &str, title: &str) -> String {
    format!(
        "以下のディスカッションを読み、学習ノートとして使える構造化要約をJSONで出力してください。\n\n\
         【タイトル】\n{title}\n\n\
         【本文】\n{content}\n\n\
         【出力フィールド】\n\
         - overview: 全体の概要（100-150文字）\n\
         - main_topic: 主題を一言で\n\
         - key_points: 重要なポイントの配列\n\
         - technical_details: 技術的な詳細\n\
         - glossary: {{term, explanation}} 専門用語の配列\n\
         - approaches: 紹介されている手法の配列\n\
         - code_examples: コード例の説明（コードは原文のまま）\n\
         - results: 報告されている結果\n\
         - related_links: 言及されているリンク\n\n\
         初心者にも分かる日本語で、JSONのみを出力してください。"
    )
}

pub fn translate_and_organize(content: &str) -> String {
    format!(
        "以下の本文を日本語に翻訳し、読みやすく整理してください。\n\n\
         【本文】\n{content}\n\n\
         【要件】\n\
         - セクションごとに {SECTION_SEPARATOR} で区切る\n\
         - 数値・スコア・コードブロックは翻訳せず原文のまま残す\n\
         - カラム名・関数名などの識別子は翻訳しない\n\
         - 見出しを付けて内容を整理する\n\
         - 翻訳文のみを出力し、前置きは不要"
    )
}

pub fn summarize_solution(content: &str, title: &str) -> String {
    format!(
        "以下の解法ポストを読み、構造化要約をJSONで出力してください。\n\n\
         【タイトル】\n{title}\n\n\
         【本文】\n{content}\n\n\
         【出力フィールド】\n\
         - overview: 解法の概要（100-150文字）\n\
         - approach: 中心となるアプローチ\n\
         - key_points: 重要なポイントの配列\n\
         - results: スコアや順位などの結果\n\
         - techniques: {{name, english, description}} 使用技術の配列\n\n\
         日本語で、JSONのみを出力してください。"
    )
}

pub fn extract_techniques(content: &str, title: &str) -> String {
    format!(
        "以下の解法ポストから使用されている技術を抽出し、重要度順にJSONで出力してください。\n\n\
         【タイトル】\n{title}\n\n\
         【本文】\n{content}\n\n\
         【出力フィールド】\n\
         - techniques: {{name, english, description}} の配列（5-10個）\n\
           - name: 技術名（日本語）\n\
           - english: 技術名（英語）\n\
           - description: この解法でどう使われたか（30-50文字）\n\n\
         本文に明記されている技術のみを抽出してください。"
    )
}

pub fn summarize_notebook(content: &str, title: &str) -> String {
    format!(
        "以下のノートブックの内容を読み、学習用の構造化要約をJSONで出力してください。\n\n\
         【タイトル】\n{title}\n\n\
         【内容】\n{content}\n\n\
         【出力フィールド】\n\
         - purpose: このノートブックの目的\n\
         - data_overview: 扱っているデータの概要\n\
         - input_data: 入力データ\n\
         - output_data: 出力・成果物\n\
         - processing_steps: 処理ステップの配列（順番どおり）\n\
         - approach: 全体のアプローチ\n\
         - key_techniques: 重要な技術の配列\n\
         - models_used: 使用モデルの配列\n\
         - glossary: {{term, explanation}} 専門用語の配列\n\
         - results: 結果・スコア\n\
         - useful_for: どんな学習者に役立つか\n\n\
         日本語で、JSONのみを出力してください。"
    )
}
