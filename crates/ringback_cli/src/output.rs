use anyhow::Result;
use ringback_core::{Conversion, Partition, Reminder, ReminderPage, ScheduleDecision};
use serde_json::json;

pub fn print_decision(decision: &ScheduleDecision, as_json: bool) -> Result<()> {
    if as_json {
        let value = match decision {
            ScheduleDecision::Unscheduled => json!({ "decision": "unscheduled" }),
            ScheduleDecision::Accepted(resolution) => json!({
                "decision": "accepted",
                "instant": resolution.instant,
                "conversion": conversion_label(&resolution.conversion),
                "degraded": resolution.is_degraded(),
            }),
            ScheduleDecision::Rejected(rejection) => json!({
                "decision": "rejected",
                "field": rejection.field,
                "reason": rejection.reason.code(),
                "message": rejection.to_string(),
            }),
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    match decision {
        ScheduleDecision::Unscheduled => println!("unscheduled (no date selected)"),
        ScheduleDecision::Accepted(resolution) => {
            println!(
                "accepted {} via {}",
                resolution.instant,
                conversion_label(&resolution.conversion)
            );
            if let Conversion::Degraded(degraded) = &resolution.conversion {
                println!(
                    "warning: zone `{}` unusable ({}), resolved in ambient zone",
                    degraded.timezone,
                    degraded.reason.as_str()
                );
            }
        }
        ScheduleDecision::Rejected(rejection) => {
            println!("rejected [{}] {}", rejection.field.as_str(), rejection);
        }
    }
    Ok(())
}

pub fn print_reminder(reminder: &Reminder, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(reminder)?);
    } else {
        println!("{}", reminder_line(reminder));
    }
    Ok(())
}

pub fn print_page(page: &ReminderPage, as_json: bool) -> Result<()> {
    if as_json {
        let value = json!({
            "items": page.items,
            "total": page.total,
            "page": page.page,
            "limit": page.limit,
            "total_pages": page.total_pages,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    if page.items.is_empty() {
        println!("No reminders found.");
    }
    for reminder in &page.items {
        println!("{}", reminder_line(reminder));
    }
    println!("page {} of {} ({} total)", page.page, page.total_pages, page.total);
    Ok(())
}

pub fn print_partition(partition: &Partition, as_json: bool) -> Result<()> {
    if as_json {
        let value = json!({
            "upcoming": partition.upcoming,
            "past": partition.past,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Upcoming");
    if partition.upcoming.is_empty() {
        println!("  No upcoming reminders.");
    }
    for reminder in &partition.upcoming {
        println!("  {}", reminder_line(reminder));
    }
    println!("Past");
    if partition.past.is_empty() {
        println!("  No past reminders.");
    }
    for reminder in &partition.past {
        println!("  {}", reminder_line(reminder));
    }
    Ok(())
}

fn reminder_line(reminder: &Reminder) -> String {
    let when = reminder
        .scheduled_time
        .map(|at| at.to_string())
        .unwrap_or_else(|| "not scheduled".to_string());
    format!(
        "#{} [{}] {} | {} | {}",
        reminder.id,
        reminder.status.as_str(),
        when,
        reminder.title,
        reminder.phone_to_call
    )
}

fn conversion_label(conversion: &Conversion) -> String {
    match conversion {
        Conversion::ZoneAware(tz) => tz.name().to_string(),
        Conversion::Ambient => "ambient zone".to_string(),
        Conversion::Degraded(_) => "ambient zone (degraded)".to_string(),
    }
}
