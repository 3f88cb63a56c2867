pub const DEFAULT_TITLE: &str = "AI Resume Generator";

/// Page title and heading derived from the company-name field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTitle {
    pub title: String,
    pub heading: String,
}

pub fn page_title(company_name: &str) -> PageTitle {
    let company = company_name.trim();
    if company.is_empty() {
        PageTitle {
            title: DEFAULT_TITLE.to_string(),
            heading: DEFAULT_TITLE.to_string(),
        }
    } else {
        PageTitle {
            title: format!("{company}'s Resume | {DEFAULT_TITLE}"),
            heading: format!("{DEFAULT_TITLE} – {company}"),
        }
    }
}
