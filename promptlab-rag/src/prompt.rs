//! Prompt construction for grounded answers.

/// Build the prompt that asks the model to answer `question` from `context`.
///
/// The model is told to use only the fragments and to say so when the answer
/// is not in the document. `language`, when set, fixes the answer language.
pub fn build_prompt(question: &str, context: &str, language: Option<&str>) -> String {
    let language_line = match language {
        Some(language) => format!("Answer in {language}, clearly and briefly."),
        None => "Answer clearly and briefly.".to_string(),
    };

    format!(
        "You are an assistant that answers questions about a document.\n\
         \n\
         User question:\n\
         {question}\n\
         \n\
         These are the most relevant fragments of the document:\n\
         \n\
         {context}\n\
         \n\
         Use only the information in these fragments to answer.\n\
         If the answer is not in the document, say so clearly.\n\
         {language_line}\n"
    )
}
