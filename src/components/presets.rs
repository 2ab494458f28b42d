use dioxus::prelude::*;

use crate::components::{DataTable, GroupView};
use crate::shared::descriptor;

#[allow(non_snake_case)]
#[component]
pub fn DailySpendingGroup() -> Element {
    rsx! { GroupView { group: descriptor::daily_spending() } }
}

#[allow(non_snake_case)]
#[component]
pub fn WeeklySpendingGroup() -> Element {
    rsx! { GroupView { group: descriptor::weekly_spending() } }
}

#[allow(non_snake_case)]
#[component]
pub fn MonthlySpendingGroup() -> Element {
    rsx! { GroupView { group: descriptor::monthly_spending() } }
}

#[allow(non_snake_case)]
#[component]
pub fn AverageDailySpendingGroup() -> Element {
    rsx! { GroupView { group: descriptor::average_daily_spending() } }
}

#[allow(non_snake_case)]
#[component]
pub fn AverageMonthlySpendingGroup() -> Element {
    rsx! { GroupView { group: descriptor::average_monthly_spending() } }
}

#[allow(non_snake_case)]
#[component]
pub fn ReadingTable() -> Element {
    rsx! { DataTable { descriptor: descriptor::readings() } }
}
