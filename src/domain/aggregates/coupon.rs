//! Coupon redemption rules.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// The terms a stored coupon carries, independent of how it is persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct CouponTerms {
    pub discount: Decimal,
    pub is_active: bool,
    pub expiry: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouponRejection {
    Inactive,
    Expired,
}

impl CouponTerms {
    /// Decides whether the coupon can be redeemed at `now`. Expiry is a
    /// policy switch: when `enforce_expiry` is off, only activity counts.
    pub fn redeemable(&self, now: DateTime<Utc>, enforce_expiry: bool) -> Result<(), CouponRejection> {
        if !self.is_active {
            return Err(CouponRejection::Inactive);
        }
        if enforce_expiry && self.expiry < now {
            return Err(CouponRejection::Expired);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn terms(is_active: bool, expiry: DateTime<Utc>) -> CouponTerms {
        CouponTerms { discount: Decimal::new(10, 0), is_active, expiry }
    }

    #[test]
    fn test_active_unexpired_coupon_is_redeemable() {
        let now = Utc::now();
        assert_eq!(terms(true, now + Duration::days(1)).redeemable(now, true), Ok(()));
    }

    #[test]
    fn test_inactive_coupon_is_rejected() {
        let now = Utc::now();
        let t = terms(false, now + Duration::days(1));
        assert_eq!(t.redeemable(now, true), Err(CouponRejection::Inactive));
        // inactivity wins even when expiry is not enforced
        assert_eq!(t.redeemable(now, false), Err(CouponRejection::Inactive));
    }

    #[test]
    fn test_expired_coupon_is_rejected_when_expiry_enforced() {
        let now = Utc::now();
        let t = terms(true, now - Duration::days(1));
        assert_eq!(t.redeemable(now, true), Err(CouponRejection::Expired));
    }

    #[test]
    fn test_expired_coupon_is_accepted_when_expiry_not_enforced() {
        let now = Utc::now();
        let t = terms(true, now - Duration::days(1));
        assert_eq!(t.redeemable(now, false), Ok(()));
    }
}
