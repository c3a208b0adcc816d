// Prompt synthesis for question generation.
//
// The prompt is Chinese because the game and its players are; the model is
// asked to answer with a bare JSON array of question objects.

use super::{QuizConfig, Subject};

/// Grade tier used to pick subject guidance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeBand {
    /// Grades 1-2.
    Lower,
    /// Grades 3-4.
    Middle,
    /// Grades 5 and up.
    Upper,
}

impl GradeBand {
    pub fn for_grade(grade: u8) -> Self {
        match grade {
            0..=2 => GradeBand::Lower,
            3..=4 => GradeBand::Middle,
            _ => GradeBand::Upper,
        }
    }
}

/// Topic focus for a subject at a grade band.
pub fn subject_guidance(subject: Subject, band: GradeBand) -> &'static str {
    match (subject, band) {
        (Subject::Math, GradeBand::Lower) => {
            "数学题目重点：10以内加减法、简单的数数、基础几何图形识别、认识时间"
        }
        (Subject::Math, GradeBand::Middle) => {
            "数学题目重点：乘法表、两位数运算、简单分数、基础几何、面积周长"
        }
        (Subject::Math, GradeBand::Upper) => {
            "数学题目重点：小数运算、分数运算、百分数、几何面积计算、解方程"
        }
        (Subject::Chinese, GradeBand::Lower) => {
            "语文题目重点：汉字识别、拼音、简单词语、基础阅读理解、看图说话"
        }
        (Subject::Chinese, GradeBand::Middle) => {
            "语文题目重点：词语理解、成语、简单古诗、阅读理解、标点符号"
        }
        (Subject::Chinese, GradeBand::Upper) => {
            "语文题目重点：古诗词、文言文、修辞手法、综合阅读理解、作文技巧"
        }
        (Subject::English, GradeBand::Lower) => {
            "英语题目重点：基础单词、字母、简单句型、日常用语、颜色数字"
        }
        (Subject::English, GradeBand::Middle) => {
            "英语题目重点：常用词汇、简单语法、基础对话、词汇翻译、现在时态"
        }
        (Subject::English, GradeBand::Upper) => {
            "英语题目重点：语法时态、词汇理解、阅读理解、句型转换、完形填空"
        }
    }
}

/// Build the generation prompt for a question set.
pub fn build_prompt(config: &QuizConfig) -> String {
    let grade = config.grade;
    let count = config.count;
    let subject = config.subject.display_name();

    let mut prompt = format!(
        r#"请为{grade}年级学生生成{count}道{subject}题目，用于塔防游戏中的答题环节。

要求：
1. 题目难度适合{grade}年级学生
2. 每道题目包含：题目内容、4个选项、正确答案
3. 题目要有趣且富有挑战性，避免重复
4. 题目难度要有梯度变化，从简单到困难
5. 请严格按照以下JSON格式返回，不要包含任何其他文字：

[
  {{
    "id": 1,
    "question": "题目内容",
    "options": ["选项A", "选项B", "选项C", "选项D"],
    "correct": "正确答案",
    "grade": {grade},
    "subject": "{subject}",
    "difficulty": "easy/medium/hard"
  }},
  ...
]

"#
    );

    let guidance = subject_guidance(config.subject, GradeBand::for_grade(grade));
    prompt.push_str(&format!("\n{guidance}\n"));

    if !config.custom_topic.trim().is_empty() {
        prompt.push_str(&format!("\n特别关注以下内容：{}\n", config.custom_topic));
    }

    prompt.push_str(&format!(
        "\n请确保返回的是有效的JSON数组格式，包含{count}道题目，题目要多样化且有趣。"
    ));
    prompt
}
