// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Faculty codes (last two characters of a student id).

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Faculty {
    pub code: &'static str,
    pub faculty_en: &'static str,
    pub faculty_th: &'static str,
}

const fn faculty(code: &'static str, faculty_en: &'static str, faculty_th: &'static str) -> Faculty {
    Faculty {
        code,
        faculty_en,
        faculty_th,
    }
}

pub const FACULTIES: &[Faculty] = &[
    faculty("01", "The Sirindhorn Thai Language Institute", "สถาบันภาษาไทยสิรินธร"),
    faculty("02", "Office of Academic Affairs", "ศูนย์การศึกษาทั่วไป"),
    faculty("20", "Graduate School", "บัณฑิตวิทยาลัย"),
    faculty("21", "Faculty of Engineering", "คณะวิศวกรรมศาสตร์"),
    faculty("22", "Faculty of Arts", "คณะอักษรศาสตร์"),
    faculty("23", "Faculty of Science", "คณะวิทยาศาสตร์"),
    faculty("24", "Faculty of Political Science", "คณะรัฐศาสตร์"),
    faculty("25", "Faculty of Architecture", "คณะสถาปัตยกรรมศาสตร์"),
    faculty("26", "Faculty of Commerce And Accountancy", "คณะพาณิชยศาสตร์และการบัญชี"),
    faculty("27", "Faculty of Education", "คณะครุศาสตร์"),
    faculty("28", "Faculty of Communication Arts", "คณะนิเทศศาสตร์"),
    faculty("29", "Faculty of Economics", "คณะเศรษฐศาสตร์"),
    faculty("30", "Faculty of Medicine", "คณะแพทยศาสตร์"),
    faculty("31", "Faculty of Veterinary Science", "คณะสัตวแพทยศาสตร์"),
    faculty("32", "Faculty of Dentistry", "คณะทันตแพทยศาสตร์"),
    faculty("33", "Faculty of Pharmaceutical Sciences", "คณะเภสัชศาสตร์"),
    faculty("34", "Faculty of Law", "คณะนิติศาสตร์"),
    faculty("35", "Faculty of Fine And Applied Arts", "คณะศิลปกรรมศาสตร์"),
    faculty("36", "Faculty of Nursing", "คณะพยาบาลศาสตร์"),
    faculty("37", "Faculty of Allied Health Sciences", "คณะสหเวชศาสตร์"),
    faculty("38", "Faculty of Psychology", "คณะจิตวิทยา"),
    faculty("39", "Faculty of Sports Science", "คณะวิทยาศาสตร์การกีฬา"),
    faculty("40", "School of Agricultural Resources", "วิทยาลัยประชากรศาสตร์"),
    faculty("51", "College of Population Studies", "วิทยาลัยประชากรศาสตร์"),
    faculty("53", "College of Public Health Sciences", "วิทยาลัยวิทยาศาสตร์สาธารณสุข"),
    faculty("55", "Language Institute", "สถาบันภาษา"),
    faculty("56", "School of Integrated Innovation", "สถาบันนวัตกรรมบูรณาการ"),
    faculty("58", "Sasin Graduate Institute of Business Administion", "สถาบันบัณฑิตบริหารธุรกิจ ศศินทร์ฯ"),
    faculty("99", "Other University", "มหาวิทยาลัยอื่น"),
];

pub fn lookup(code: &str) -> Option<&'static Faculty> {
    FACULTIES.iter().find(|f| f.code == code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn codes_are_unique_two_digit_strings() {
        let mut seen = HashSet::new();
        for f in FACULTIES {
            assert_eq!(f.code.len(), 2);
            assert!(f.code.bytes().all(|b| b.is_ascii_digit()));
            assert!(seen.insert(f.code), "duplicate code {}", f.code);
        }
    }

    #[test]
    fn lookup_known_and_unknown() {
        assert_eq!(lookup("21").unwrap().faculty_en, "Faculty of Engineering");
        assert_eq!(lookup("01").unwrap().faculty_th, "สถาบันภาษาไทยสิรินธร");
        assert!(lookup("80").is_none());
        assert!(lookup("").is_none());
    }
}
