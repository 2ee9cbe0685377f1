use chrono::NaiveDate;

/// User turn for a search: the query plus today's date as time context.
pub fn search_prompt(query: &str, today: NaiveDate) -> String {
    format!(
        "\n<query>\n{query}\n</query>\n\nTime Context: today is {}\n\n",
        today.format("%Y-%m-%d")
    )
}

pub fn summary_prompt(query: &str, answer: &str) -> String {
    format!("Query: {query}\n\nSearch Results:\n{answer}")
}
