use crate::time::Duration;

impl TryFrom<time::Duration> for Duration {
    type Error = time::error::ConversionRange;

    fn try_from(value: time::Duration) -> Result<Self, Self::Error> {
        let std_duration = std::time::Duration::try_from(value)?;
        Ok(Self::from(std_duration))
    }
}

impl TryFrom<Duration> for time::Duration {
    type Error = time::error::ConversionRange;

    fn try_from(value: Duration) -> Result<Self, Self::Error> {
        time::Duration::try_from(Into::<std::time::Duration>::into(value))
    }
}
