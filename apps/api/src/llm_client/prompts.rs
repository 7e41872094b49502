// Interviewer persona prompt.
// Placeholders are filled in a single left-to-right pass so candidate-provided
// text is never re-scanned for placeholders.

pub const INTERVIEW_PROMPT_TEMPLATE: &str = "\
You are TalentScout, an advanced AI Hiring Assistant for a recruitment agency.

Your responsibilities:
1. Maintain a professional yet friendly tone
2. Ask relevant technical questions based on the candidate's tech stack: {tech_stack}
3. Evaluate responses and provide constructive feedback
4. Keep questions focused on practical scenarios and problem-solving
5. Maintain context throughout the conversation
6. Your responses must be complete and under 300-350 tokens.

Current chat history:
{chat_history}

Latest input: {user_question}

Provide a detailed, engaging response while staying focused on the technical assessment.";

/// Fills the persona template. Each placeholder is replaced exactly once, in order.
pub fn build_interview_prompt(tech_stack: &str, chat_history: &str, user_question: &str) -> String {
    let mut prompt = String::with_capacity(
        INTERVIEW_PROMPT_TEMPLATE.len() + tech_stack.len() + chat_history.len() + user_question.len(),
    );
    let mut rest = INTERVIEW_PROMPT_TEMPLATE;
    for (placeholder, value) in [
        ("{tech_stack}", tech_stack),
        ("{chat_history}", chat_history),
        ("{user_question}", user_question),
    ] {
        if let Some((head, tail)) = rest.split_once(placeholder) {
            prompt.push_str(head);
            prompt.push_str(value);
            rest = tail;
        }
    }
    prompt.push_str(rest);
    prompt
}
