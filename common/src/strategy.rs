// Title strategies: category key -> push title, one table per category family

use crate::models::FamilyKind;
use std::collections::HashMap;
use std::sync::Arc;

/// Title used when a category has no entry in its family's table
pub const FALLBACK_TITLE: &str = "새로운 공지사항이 있어요!";

/// Derives the display title of a push from a category key
pub trait TitleStrategy: Send + Sync {
    fn title(&self, category: &str) -> String;
}

/// Static table lookup with the fixed fallback
///
/// Keys are matched case-insensitively, since category keys may arrive
/// lower-cased from layered configuration.
#[derive(Debug, Clone)]
pub struct MappedTitleStrategy {
    titles: HashMap<String, &'static str>,
}

impl MappedTitleStrategy {
    pub fn new(entries: &[(&str, &'static str)]) -> Self {
        let titles = entries
            .iter()
            .map(|(key, title)| (key.to_ascii_uppercase(), *title))
            .collect();
        Self { titles }
    }
}

impl TitleStrategy for MappedTitleStrategy {
    fn title(&self, category: &str) -> String {
        self.titles
            .get(&category.to_ascii_uppercase())
            .copied()
            .unwrap_or(FALLBACK_TITLE)
            .to_string()
    }
}

const ACADEMIC_CALENDAR_TITLES: &[(&str, &str)] = &[
    ("ACADEMIC_CALENDAR", "학사일정이 등록되었어요!"),
    ("UNDERGRADUATE", "학부 학사일정이 등록되었어요!"),
    ("GRADUATE", "대학원 학사일정이 등록되었어요!"),
];

const DEPARTMENT_TITLES: &[(&str, &str)] = &[
    ("CSE", "컴퓨터공학부 새 공지"),
    ("EE", "전자공학부 새 공지"),
    ("ME", "기계공학부 새 공지"),
    ("CHEM", "화학공학과 새 공지"),
    ("ARCH", "건축학부 새 공지"),
    ("BIZ", "경영학부 새 공지"),
    ("ECON", "경제학과 새 공지"),
    ("KOR", "국어국문학과 새 공지"),
    ("ENG", "영어영문학과 새 공지"),
    ("DESIGN", "디자인학부 새 공지"),
    ("MATH", "수학과 새 공지"),
    ("PHYS", "물리학과 새 공지"),
];

const LIBRARY_TITLES: &[(&str, &str)] = &[
    ("LIBRARY", "도서관 새 공지"),
    ("LIBRARY_EVENT", "도서관 행사 안내"),
    ("LIBRARY_HOURS", "도서관 운영시간 변경 안내"),
];

const UNIVERSITY_TITLES: &[(&str, &str)] = &[
    ("GENERAL", "새로운 일반 공지"),
    ("ACADEMIC", "새로운 학사 공지"),
    ("SCHOLARSHIP", "새로운 장학 공지"),
    ("RECRUITMENT", "새로운 채용 공지"),
    ("EVENT", "새로운 행사 공지"),
    ("DORMITORY", "새로운 생활관 공지"),
];

/// Built-in strategy of a category family
pub fn title_strategy_for(kind: FamilyKind) -> Arc<dyn TitleStrategy> {
    let entries = match kind {
        FamilyKind::AcademicCalendar => ACADEMIC_CALENDAR_TITLES,
        FamilyKind::Department => DEPARTMENT_TITLES,
        FamilyKind::Library => LIBRARY_TITLES,
        FamilyKind::University => UNIVERSITY_TITLES,
    };
    Arc::new(MappedTitleStrategy::new(entries))
}
