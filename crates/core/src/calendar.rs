//! Month view of appointments.

use crate::models::Cita;
use chrono::{Datelike, NaiveDate};
use std::fmt::Write as _;

const DIAS: [&str; 7] = ["Lu", "Ma", "Mi", "Ju", "Vi", "Sa", "Do"];

#[derive(Debug, Clone, PartialEq)]
pub struct DiaCalendario<'a> {
    pub fecha: NaiveDate,
    /// Sorted by time.
    pub citas: Vec<&'a Cita>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthGrid<'a> {
    pub year: i32,
    pub month: u32,
    /// One entry per day of the month, in order.
    pub dias: Vec<DiaCalendario<'a>>,
}

/// Groups `citas` falling in `year`/`month` by day.
///
/// Returns `None` if `month` is not 1..=12.
pub fn month_grid(citas: &[Cita], year: i32, month: u32) -> Option<MonthGrid<'_>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;

    let mut dias: Vec<DiaCalendario<'_>> = first
        .iter_days()
        .take_while(|fecha| fecha.month() == month)
        .map(|fecha| DiaCalendario {
            fecha,
            citas: Vec::new(),
        })
        .collect();

    for cita in citas {
        if cita.fecha.year() == year && cita.fecha.month() == month {
            dias[cita.fecha.day0() as usize].citas.push(cita);
        }
    }
    for dia in &mut dias {
        dia.citas.sort_by_key(|cita| cita.hora);
    }

    Some(MonthGrid { year, month, dias })
}

impl<'a> MonthGrid<'a> {
    pub fn total(&self) -> usize {
        self.dias.iter().map(|dia| dia.citas.len()).sum()
    }

    /// Monday-first weeks; `None` pads the days outside the month.
    pub fn weeks(&self) -> Vec<[Option<&DiaCalendario<'a>>; 7]> {
        let mut weeks = Vec::new();
        let mut week: [Option<&DiaCalendario<'a>>; 7] = [None; 7];

        for dia in &self.dias {
            let column = dia.fecha.weekday().num_days_from_monday() as usize;
            week[column] = Some(dia);
            if column == 6 {
                weeks.push(week);
                week = [None; 7];
            }
        }
        if week.iter().any(Option::is_some) {
            weeks.push(week);
        }
        weeks
    }

    /// Text grid: each cell shows the day and, when there are any, the number of appointments.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{:04}-{:02}", self.year, self.month);
        let _ = writeln!(out, "{}", DIAS.map(|d| format!("{d:<7}")).join(""));
        for week in self.weeks() {
            let line: String = week
                .iter()
                .map(|cell| match cell {
                    Some(dia) if !dia.citas.is_empty() => {
                        format!("{:<7}", format!("{}({})", dia.fecha.day(), dia.citas.len()))
                    }
                    Some(dia) => format!("{:<7}", dia.fecha.day()),
                    None => " ".repeat(7),
                })
                .collect();
            let _ = writeln!(out, "{}", line.trim_end());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use uuid::Uuid;

    fn cita(fecha: (i32, u32, u32), hora: (u32, u32)) -> Cita {
        Cita {
            id: Uuid::new_v4(),
            deportista_id: Uuid::nil(),
            fecha: NaiveDate::from_ymd_opt(fecha.0, fecha.1, fecha.2).unwrap(),
            hora: NaiveTime::from_hms_opt(hora.0, hora.1, 0).unwrap(),
            tipo_cita_id: Uuid::nil(),
            estado_cita_id: Uuid::nil(),
            observaciones: None,
            created_at: None,
            tipo_cita: None,
            estado_cita: None,
        }
    }

    #[test]
    fn test_groups_by_day_sorted_by_time() {
        let citas = vec![
            cita((2024, 2, 29), (15, 0)),
            cita((2024, 2, 29), (8, 30)),
            cita((2024, 3, 1), (9, 0)),
            cita((2024, 2, 1), (10, 0)),
        ];
        let grid = month_grid(&citas, 2024, 2).unwrap();

        assert_eq!(grid.dias.len(), 29);
        assert_eq!(grid.total(), 3);
        let last = &grid.dias[28];
        assert_eq!(last.citas.len(), 2);
        assert_eq!(last.citas[0].hora, NaiveTime::from_hms_opt(8, 30, 0).unwrap());
    }

    #[test]
    fn test_weeks_are_monday_first() {
        // 1 February 2024 was a Thursday.
        let grid = month_grid(&[], 2024, 2).unwrap();
        let weeks = grid.weeks();
        assert!(weeks[0][0].is_none());
        assert_eq!(weeks[0][3].map(|d| d.fecha.day()), Some(1));
        assert_eq!(weeks.len(), 5);
    }

    #[test]
    fn test_invalid_month() {
        assert!(month_grid(&[], 2024, 13).is_none());
        assert!(month_grid(&[], 2024, 0).is_none());
    }

    #[test]
    fn test_render_marks_busy_days() {
        let citas = vec![cita((2024, 2, 5), (9, 0))];
        let text = month_grid(&citas, 2024, 2).unwrap().render_text();
        assert!(text.starts_with("2024-02"));
        assert!(text.contains("5(1)"));
    }
}
