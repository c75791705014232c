//! Prompt construction for the question and feedback generators.
//!
//! Pure string building, kept separate from the HTTP client so the exact
//! wording can be unit tested. Technical sessions reference the resume and
//! job description verbatim; HR and Managerial sessions never do.

use crate::interview::{InterviewConfig, InterviewKind};

/// Candidates with at least this many completed sessions of the same kind
/// get the harder question variants.
pub const HARD_SESSION_THRESHOLD: u32 = 5;

fn difficulty_note(kind: InterviewKind, prior_sessions: u32) -> String {
    if prior_sessions < HARD_SESSION_THRESHOLD {
        return String::new();
    }
    format!(
        "\n\nIMPORTANT: This candidate has completed {prior_sessions} previous {} interview \
         sessions. Please generate more challenging and advanced questions appropriate for an \
         experienced candidate. Focus on complex scenarios, leadership challenges, crisis \
         management, advanced behavioral situations, and sophisticated problem-solving scenarios.",
        kind.label()
    )
}

fn company_or_default(config: &InterviewConfig) -> &str {
    config.company.as_deref().unwrap_or("the target company")
}

/// Builds the prompt for the first question batch of a session.
pub fn initial_prompt(config: &InterviewConfig, prior_sessions: u32) -> String {
    let category_instructions = match config.kind {
        InterviewKind::Technical => format!(
            "- The interview type is Technical. Greet the candidate by name and try to use \
             their name at least four times throughout the session. Carefully analyze the \
             resume content and job description provided. Ask the candidate a structured set \
             of questions in the following order:\n\
             1. One introductory question\n\
             2. Two or three questions about experience (if experience is available)\n\
             3. Three project-related questions: one simple, one moderately technical, and \
             one that requires deeper thinking\n\
             4. Up to seven questions based on the candidate's skills from their resume \
             (medium difficulty)\n\
             5. One or two situational or scenario-based questions\n\
             6. Two questions related to the job description\n\
             Resume Content: {}\n\
             Job Description: {}",
            config.resume,
            config.job_description.as_deref().unwrap_or(""),
        ),
        InterviewKind::Hr => "- The interview type is HR. Do not refer to the resume or job \
             description. Ask a total of around ten questions focusing on general HR topics \
             such as self-introduction, strengths and weaknesses, teamwork, time management, \
             handling pressure, conflict resolution, adaptability, career goals, and company \
             fit."
            .to_string(),
        InterviewKind::Managerial => "- The interview type is Managerial. Ignore the resume and \
             job description. Ask around ten situational or behavioral questions designed to \
             evaluate soft skills and past experiences. Focus on real-world situations where \
             the candidate demonstrated leadership, problem solving, adaptability, initiative, \
             teamwork, or decision-making."
            .to_string(),
    };

    format!(
        "You are acting as a mock interviewer for a candidate preparing for an interview. The \
         candidate's name is {name}, and they are a {graduation} graduate with {experience} \
         experience. They are applying for the role of {role} at {company}. The type of \
         interview you are conducting is: {kind}.\n\n\
         {category_instructions}\n\n\
         Important Instructions:\n\
         - Keep all questions within basic to medium difficulty only.\n\
         - Avoid complex case studies, algorithms, deep system design, or highly technical \
         puzzles.\n\
         - Focus on real-world, resume-based, and role-relevant questions that freshers or \
         junior professionals can reasonably answer.\n\
         - Make the questions sound like a calm, helpful, and curious human interviewer would \
         ask — avoid robotic or scripted tone.\n\
         - Don't label the questions with difficulty or type.\n\
         - At the end, return only the list of interview questions, one per line, and nothing \
         else. Do not include any extra explanation, headings, or notes.{difficulty}",
        name = config.candidate,
        graduation = config.graduation,
        experience = config.experience,
        role = config.role,
        company = company_or_default(config),
        kind = config.kind.label(),
        difficulty = difficulty_note(config.kind, prior_sessions),
    )
}

/// Builds the prompt for a mid-session continuation batch: no introductory
/// questions, skewed toward advanced scenarios regardless of category.
pub fn continuation_prompt(config: &InterviewConfig, prior_sessions: u32) -> String {
    let category_focus = match config.kind {
        InterviewKind::Technical => format!(
            "- The interview type is Technical. Focus on:\n\
             * Advanced technical questions based on the candidate's skills from their resume\n\
             * Project-specific questions that require deeper technical understanding\n\
             * Scenario-based technical problems\n\
             * Questions about specific technologies mentioned in their resume\n\
             * Problem-solving questions related to their field\n\
             Resume Content: {}\n\
             Job Description: {}",
            config.resume,
            config.job_description.as_deref().unwrap_or(""),
        ),
        InterviewKind::Hr => "- The interview type is HR. Focus on:\n\
             * Advanced behavioral scenarios\n\
             * Leadership and management situations\n\
             * Conflict resolution in complex scenarios\n\
             * Career development and growth questions\n\
             * Company culture and values alignment"
            .to_string(),
        InterviewKind::Managerial => "- The interview type is Managerial. Focus on:\n\
             * Complex situational questions\n\
             * Leadership challenges\n\
             * Crisis management scenarios\n\
             * Team dynamics in difficult situations\n\
             * Innovation and creativity examples"
            .to_string(),
    };

    format!(
        "You are continuing a mock interview session. The candidate's name is {name}, and they \
         are a {graduation} graduate with {experience} experience. They are applying for the \
         role of {role} at {company}. The type of interview is: {kind}.\n\n\
         The candidate has already answered several questions and we need to continue with \
         fresh questions. Please generate NEW questions that are different from typical \
         introductory questions.\n\n\
         {category_focus}\n\n\
         Important Instructions:\n\
         - DO NOT include any introductory questions like \"Hi\", \"Tell me about yourself\", \
         or basic introduction questions\n\
         - Focus on medium to advanced difficulty questions\n\
         - Make questions specific to the candidate's background and role\n\
         - Avoid repetition of common basic questions\n\
         - Keep questions relevant to the interview type\n\
         - Return only the list of questions, one per line, no explanations or \
         formatting{difficulty}",
        name = config.candidate,
        graduation = config.graduation,
        experience = config.experience,
        role = config.role,
        company = company_or_default(config),
        kind = config.kind.label(),
        difficulty = difficulty_note(config.kind, prior_sessions),
    )
}

fn transcript_block(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .enumerate()
        .map(|(i, (q, a))| format!("Q{n}: {q}\nA{n}: {a}", n = i + 1))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Builds the evaluation prompt over the answered transcript. The two
/// templates are mutually exclusive: Technical sessions are scored on
/// communication plus a technical dimension, HR/Managerial on communication
/// plus a combined logical/behavioral dimension.
pub fn feedback_prompt(kind: InterviewKind, pairs: &[(String, String)]) -> String {
    let data = transcript_block(pairs);

    if kind.uses_behavioral_scoring() {
        format!(
            "You are acting as an AI interview evaluator for an {kind} interview. The user has \
             completed a mock interview session. During the session, the following data was \
             collected:\n\n\
             - A series of interview questions presented to the candidate\n\
             - Transcribed answers spoken by the candidate in response to each question\n\n\
             IMPORTANT: Only analyze the question-answer pairs provided below. Do NOT analyze \
             questions that the user did not answer. Do NOT make up or assume answers for \
             questions that were not answered by the user.\n\n\
             Now, your task is to analyze and evaluate ONLY the answered questions in detail. \
             For each question-answer pair provided, provide a structured and clear evaluation \
             based on the following metrics:\n\n\
             1. Individual Communication Score: (Scale of 1 to 10)\n\
             2. Fluency & Grammar Comments:\n\
             3. Behavioral Relevance Comment:\n\n\
             Do this for each individual question and response that was actually answered.\n\n\
             After you finish evaluating all answered question-answer pairs, also provide a \
             final overall interview summary, including:\n\n\
             - Overall Score (Scale of 1 to 100)\n\
             - Overall Communication Score (0-100)\n\
             - Overall Logical & Behavioral Score (0-100) - Combined score for logical \
             thinking and behavioral responses\n\
             - General feedback or suggestions to improve their overall performance (list all \
             suggestions at the end, not per question).\n\n\
             Here is the data (only questions that were answered):\n\
             {data}\n\n\
             Please return the full output as a valid JSON object structured like this:\n\n\
             {{\n\
             \"overallScore\": 85,\n\
             \"communicationScore\": 88,\n\
             \"logicalBehavioralScore\": 82,\n\
             \"interviewSummary\": \"Short paragraph summary...\",\n\
             \"overallSuggestions\": [\"...\", \"...\"],\n\
             \"questions\": [\n\
             {{\n\
             \"question\": \"Tell me about a challenging situation you faced.\",\n\
             \"answer\": \"User's full transcribed answer...\",\n\
             \"communicationScore\": 8,\n\
             \"fluencyComment\": \"Spoke fluently with a few hesitations.\",\n\
             \"behavioralComment\": \"Demonstrated good problem-solving approach.\"\n\
             }}\n\
             ]\n\
             }}\n\n\
             Note: Only include questions that were actually answered by the user. Do not \
             include questions that were not answered.\n\n\
             IMPORTANT: Return ONLY the JSON object above. Do NOT add any extra text, \
             explanation, markdown, or formatting. Do NOT use triple backticks. Do NOT add any \
             text before or after the JSON. The response must be a valid JSON object only.",
            kind = kind.label(),
            data = data,
        )
    } else {
        format!(
            "You are acting as an AI interview evaluator for a Technical interview. The user \
             has completed a mock interview session. During the session, the following data \
             was collected:\n\n\
             - A series of interview questions presented to the candidate\n\
             - Transcribed answers spoken by the candidate in response to each question\n\n\
             IMPORTANT: Only analyze the question-answer pairs provided below. Do NOT analyze \
             questions that the user did not answer. Do NOT make up or assume answers for \
             questions that were not answered by the user.\n\n\
             Now, your task is to analyze and evaluate ONLY the answered questions in detail. \
             For each question-answer pair provided, provide a structured and clear evaluation \
             based on the following metrics:\n\n\
             1. Individual Communication Score: (Scale of 1 to 10)\n\
             2. Individual Technical Score: (Scale of 1 to 10)\n\
             3. Fluency & Grammar Comments:\n\
             4. Technical Relevance Comment:\n\n\
             Do this for each individual question and response that was actually answered.\n\n\
             After you finish evaluating all answered question-answer pairs, also provide a \
             final overall interview summary, including:\n\n\
             - Overall Score (Scale of 1 to 100)\n\
             - Overall Communication Score (0-100)\n\
             - Overall Technical Score (0-100)\n\
             - General feedback or suggestions to improve their overall performance (list all \
             suggestions at the end, not per question).\n\n\
             Here is the data (only questions that were answered):\n\
             {data}\n\n\
             Please return the full output as a valid JSON object structured like this:\n\n\
             {{\n\
             \"overallScore\": 85,\n\
             \"communicationScore\": 88,\n\
             \"technicalScore\": 82,\n\
             \"interviewSummary\": \"Short paragraph summary...\",\n\
             \"overallSuggestions\": [\"...\", \"...\"],\n\
             \"questions\": [\n\
             {{\n\
             \"question\": \"Tell me about a project you worked on.\",\n\
             \"answer\": \"User's full transcribed answer...\",\n\
             \"communicationScore\": 8,\n\
             \"technicalScore\": 7,\n\
             \"fluencyComment\": \"Spoke fluently with a few hesitations.\",\n\
             \"techComment\": \"Answered with basic understanding, could go deeper.\"\n\
             }}\n\
             ]\n\
             }}\n\n\
             Note: Only include questions that were actually answered by the user. Do not \
             include questions that were not answered.\n\n\
             IMPORTANT: Return ONLY the JSON object above. Do NOT add any extra text, \
             explanation, markdown, or formatting. Do NOT use triple backticks. Do NOT add any \
             text before or after the JSON. The response must be a valid JSON object only.",
            data = data,
        )
    }
}
