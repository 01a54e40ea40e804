use super::BriefRequest;

/// Full single-turn prompt for completion-style backends.
pub fn analyst_prompt(request: &BriefRequest) -> String {
    format!(
        "You are a defensive security analyst.
Write an executive brief (max 10 bullets) for a software team based on the findings below.

Requirements:
- Start with a one-line summary including the risk score: {score}/100
- Give 3 priority actions (what to do first)
- Call out any packages that appear multiple times or look high-impact
- Keep it practical and non-alarmist

Findings (JSON):
{findings}
",
        score = request.risk_score,
        findings = request.findings_json_pretty(),
    )
}

/// System instructions for chat-style backends; findings go in a separate message.
pub fn analyst_instructions(risk_score: u8) -> String {
    format!(
        "You are a defensive security analyst. \
         Write an executive brief (max 10 bullets) for a software team. \
         Include the risk score {risk_score}/100 in the first line, then 3 priority actions."
    )
}
