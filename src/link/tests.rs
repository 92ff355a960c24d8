use super::{LinkMonitor, LinkTransition};
use chrono::{TimeDelta, Utc};

const TIMEOUT: TimeDelta = TimeDelta::seconds(30);

#[test]
fn test_stays_up_within_timeout() {
    let t0 = Utc::now();
    let mut link = LinkMonitor::new(t0);
    assert_eq!(link.check_timeout(t0 + TimeDelta::seconds(30), TIMEOUT), (true, None));
    assert!(link.is_up());
}

#[test]
fn test_lost_fires_once_per_overrun() {
    let t0 = Utc::now();
    let mut link = LinkMonitor::new(t0);
    let mut lost = 0;
    for s in 0..120 {
        let (up, edge) = link.check_timeout(t0 + TimeDelta::seconds(s), TIMEOUT);
        assert_eq!(up, s <= 30);
        if edge == Some(LinkTransition::Lost) {
            lost += 1;
        }
    }
    assert_eq!(lost, 1);
    assert!(!link.is_up());
}

#[test]
fn test_restore_then_second_overrun_fires_again() {
    let t0 = Utc::now();
    let mut link = LinkMonitor::new(t0);
    let t_lost = t0 + TimeDelta::seconds(31);
    assert_eq!(link.check_timeout(t_lost, TIMEOUT).1, Some(LinkTransition::Lost));
    assert_eq!(link.record_contact(t_lost), Some(LinkTransition::Restored));
    assert_eq!(link.record_contact(t_lost + TimeDelta::seconds(1)), None);
    assert_eq!(link.check_timeout(t_lost + TimeDelta::seconds(20), TIMEOUT), (true, None));
    let t_lost_again = t_lost + TimeDelta::seconds(32);
    assert_eq!(link.check_timeout(t_lost_again, TIMEOUT), (false, Some(LinkTransition::Lost)));
    assert_eq!(link.check_timeout(t_lost_again + TimeDelta::seconds(1), TIMEOUT), (false, None));
}

#[test]
fn test_stale_contact_does_not_rewind() {
    let t0 = Utc::now();
    let mut link = LinkMonitor::new(t0 + TimeDelta::seconds(10));
    link.record_contact(t0);
    assert_eq!(link.last_contact(), t0 + TimeDelta::seconds(10));
    assert_eq!(link.silence(t0 + TimeDelta::seconds(15)), TimeDelta::seconds(5));
}
