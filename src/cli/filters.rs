//! Filter enums for list commands

use clap::ValueEnum;
use console::style;

use crate::core::lifecycle::RequirementState;
use crate::core::store::{Page, PageRequest, DEFAULT_PAGE_SIZE};

/// Search and paging flags shared by list commands
#[derive(clap::Args, Debug, Clone)]
pub struct PageArgs {
    /// Case-insensitive substring search
    #[arg(long)]
    pub search: Option<String>,

    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Results per page
    #[arg(long, short = 'n', default_value_t = DEFAULT_PAGE_SIZE)]
    pub limit: u32,

    /// Show only the total count
    #[arg(long)]
    pub count: bool,
}

impl PageArgs {
    pub fn to_request(&self) -> PageRequest {
        PageRequest::new(self.search.clone(), self.page, self.limit)
    }
}

/// Print "page X of Y" below a list when there is more than one page
pub fn print_page_footer<T>(page: &Page<T>) {
    if page.page_count() > 1 {
        println!(
            "{}",
            style(format!(
                "page {} of {} ({} total), use --page to see more",
                page.page,
                page.page_count(),
                page.total
            ))
            .dim()
        );
    }
}

/// Requirement state filter
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum StateFilter {
    /// Draft only
    Draft,
    /// Quoted only
    Quoted,
    /// Rejected only
    Rejected,
    /// Winner selected, not yet closed
    WinnerSet,
    /// Closed only
    Closed,
    /// Everything not rejected or closed
    Open,
    /// All states - default
    #[default]
    All,
}

impl StateFilter {
    /// States selected by this filter; empty means no restriction
    pub fn states(&self) -> Vec<RequirementState> {
        match self {
            StateFilter::Draft => vec![RequirementState::Draft],
            StateFilter::Quoted => vec![RequirementState::Quoted],
            StateFilter::Rejected => vec![RequirementState::Rejected],
            StateFilter::WinnerSet => vec![RequirementState::WinnerSet],
            StateFilter::Closed => vec![RequirementState::Closed],
            StateFilter::Open => RequirementState::all()
                .iter()
                .copied()
                .filter(|s| s.is_open())
                .collect(),
            StateFilter::All => Vec::new(),
        }
    }

    pub fn matches(&self, state: RequirementState) -> bool {
        let states = self.states();
        states.is_empty() || states.contains(&state)
    }
}

impl std::fmt::Display for StateFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateFilter::Draft => write!(f, "draft"),
            StateFilter::Quoted => write!(f, "quoted"),
            StateFilter::Rejected => write!(f, "rejected"),
            StateFilter::WinnerSet => write!(f, "winner-set"),
            StateFilter::Closed => write!(f, "closed"),
            StateFilter::Open => write!(f, "open"),
            StateFilter::All => write!(f, "all"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_args_request() {
        let args = PageArgs {
            search: Some("  ".to_string()),
            page: 0,
            limit: 5,
            count: false,
        };
        let request = args.to_request();
        assert_eq!(request.search, None);
        assert_eq!(request.page, 1);
        assert_eq!(request.limit, 5);
    }

    #[test]
    fn test_state_filter_matches() {
        assert!(StateFilter::Draft.matches(RequirementState::Draft));
        assert!(!StateFilter::Draft.matches(RequirementState::Quoted));

        assert!(StateFilter::Open.matches(RequirementState::WinnerSet));
        assert!(!StateFilter::Open.matches(RequirementState::Rejected));
        assert!(!StateFilter::Open.matches(RequirementState::Closed));

        assert!(StateFilter::All.matches(RequirementState::Closed));
        assert!(StateFilter::All.states().is_empty());
    }
}
