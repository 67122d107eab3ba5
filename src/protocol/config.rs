use anyhow::{anyhow, Result};
use std::{fmt, str::FromStr};
use strum::{Display, EnumIter, IntoEnumIterator};

use serialport::SerialPort;

use super::error::PortError;

/// Shared behaviour of the five UART option lists.
///
/// Each list is presented to the user in a fixed order and the selected entry
/// is tracked by its position, so conversions go through the list index.
pub trait OptionList: IntoEnumIterator + Copy + PartialEq + fmt::Display {
    /// Map a list index to the option constant. Out-of-range indices yield `None`.
    fn from_index(index: usize) -> Option<Self> {
        Self::iter().nth(index)
    }

    fn index(self) -> usize {
        Self::iter().position(|item| item == self).unwrap_or(0)
    }

    fn count() -> usize {
        Self::iter().count()
    }

    fn labels() -> Vec<String> {
        Self::iter().map(|item| item.to_string()).collect()
    }

    /// Step to the neighbouring entry, wrapping at both ends.
    fn cycled(self, forward: bool) -> Self {
        let count = Self::count();
        let index = self.index();
        let next = if forward {
            (index + 1) % count
        } else {
            (index + count - 1) % count
        };
        Self::from_index(next).unwrap_or(self)
    }
}

#[derive(EnumIter, Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaudRate {
    #[strum(to_string = "1200")]
    B1200,
    #[strum(to_string = "2400")]
    B2400,
    #[strum(to_string = "4800")]
    B4800,
    #[strum(to_string = "9600")]
    B9600,
    #[strum(to_string = "19200")]
    B19200,
    #[strum(to_string = "38400")]
    B38400,
    #[strum(to_string = "57600")]
    B57600,
    #[strum(to_string = "115200")]
    B115200,
}

impl BaudRate {
    pub fn value(self) -> u32 {
        match self {
            BaudRate::B1200 => 1200,
            BaudRate::B2400 => 2400,
            BaudRate::B4800 => 4800,
            BaudRate::B9600 => 9600,
            BaudRate::B19200 => 19200,
            BaudRate::B38400 => 38400,
            BaudRate::B57600 => 57600,
            BaudRate::B115200 => 115200,
        }
    }
}

#[derive(EnumIter, Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataBits {
    #[strum(to_string = "5 bits")]
    Five,
    #[strum(to_string = "6 bits")]
    Six,
    #[strum(to_string = "7 bits")]
    Seven,
    #[strum(to_string = "8 bits")]
    Eight,
}

impl DataBits {
    pub fn value(self) -> u8 {
        match self {
            DataBits::Five => 5,
            DataBits::Six => 6,
            DataBits::Seven => 7,
            DataBits::Eight => 8,
        }
    }
}

#[derive(EnumIter, Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    #[strum(to_string = "1 bit")]
    One,
    #[strum(to_string = "1.5 bits")]
    OneAndHalf,
    #[strum(to_string = "2 bits")]
    Two,
}

#[derive(EnumIter, Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    #[strum(to_string = "no parity")]
    None,
    #[strum(to_string = "even")]
    Even,
    #[strum(to_string = "odd")]
    Odd,
    #[strum(to_string = "space")]
    Space,
    #[strum(to_string = "mark")]
    Mark,
}

impl Parity {
    fn short(self) -> char {
        match self {
            Parity::None => 'N',
            Parity::Even => 'E',
            Parity::Odd => 'O',
            Parity::Space => 'S',
            Parity::Mark => 'M',
        }
    }
}

#[derive(EnumIter, Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowControl {
    #[strum(to_string = "no flow control")]
    None,
    #[strum(to_string = "hardware")]
    Hardware,
    #[strum(to_string = "software")]
    Software,
}

impl OptionList for BaudRate {}
impl OptionList for DataBits {}
impl OptionList for StopBits {}
impl OptionList for Parity {}
impl OptionList for FlowControl {}

impl FromStr for BaudRate {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let value: u32 = s
            .trim()
            .parse()
            .map_err(|_| anyhow!("invalid baud rate '{s}'"))?;
        BaudRate::iter()
            .find(|rate| rate.value() == value)
            .ok_or_else(|| {
                anyhow!(
                    "unsupported baud rate {value}, expected one of {}",
                    BaudRate::labels().join(", ")
                )
            })
    }
}

impl FromStr for DataBits {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim().trim_end_matches("bits").trim();
        DataBits::iter()
            .find(|bits| bits.value().to_string() == trimmed)
            .ok_or_else(|| anyhow!("invalid data bits '{s}', expected 5, 6, 7 or 8"))
    }
}

impl FromStr for StopBits {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().trim_end_matches("bits").trim_end_matches("bit").trim() {
            "1" => Ok(StopBits::One),
            "1.5" => Ok(StopBits::OneAndHalf),
            "2" => Ok(StopBits::Two),
            _ => Err(anyhow!("invalid stop bits '{s}', expected 1, 1.5 or 2")),
        }
    }
}

impl FromStr for Parity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "none" | "no" | "no parity" | "n" => Ok(Parity::None),
            "even" | "e" => Ok(Parity::Even),
            "odd" | "o" => Ok(Parity::Odd),
            "space" | "s" => Ok(Parity::Space),
            "mark" | "m" => Ok(Parity::Mark),
            _ => Err(anyhow!(
                "invalid parity '{s}', expected none, even, odd, space or mark"
            )),
        }
    }
}

impl FromStr for FlowControl {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "none" | "no" | "no flow control" => Ok(FlowControl::None),
            "hardware" | "hw" | "rtscts" => Ok(FlowControl::Hardware),
            "software" | "sw" | "xonxoff" => Ok(FlowControl::Software),
            _ => Err(anyhow!(
                "invalid flow control '{s}', expected none, hardware or software"
            )),
        }
    }
}

/// The configurable fields, in the order the config pickers are laid out.
#[derive(EnumIter, Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigField {
    #[strum(to_string = "Baud rate")]
    BaudRate,
    #[strum(to_string = "Data bits")]
    DataBits,
    #[strum(to_string = "Stop bits")]
    StopBits,
    #[strum(to_string = "Parity")]
    Parity,
    #[strum(to_string = "Flow control")]
    FlowControl,
}

impl OptionList for ConfigField {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialConfig {
    pub baud_rate: BaudRate,
    pub data_bits: DataBits,
    pub stop_bits: StopBits,
    pub parity: Parity,
    pub flow_control: FlowControl,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: BaudRate::B9600,
            data_bits: DataBits::Eight,
            stop_bits: StopBits::One,
            parity: Parity::None,
            flow_control: FlowControl::None,
        }
    }
}

impl SerialConfig {
    /// Current list index of `field`.
    pub fn index_of(&self, field: ConfigField) -> usize {
        match field {
            ConfigField::BaudRate => self.baud_rate.index(),
            ConfigField::DataBits => self.data_bits.index(),
            ConfigField::StopBits => self.stop_bits.index(),
            ConfigField::Parity => self.parity.index(),
            ConfigField::FlowControl => self.flow_control.index(),
        }
    }

    /// Display label of the current value of `field`.
    pub fn label_of(&self, field: ConfigField) -> String {
        match field {
            ConfigField::BaudRate => self.baud_rate.to_string(),
            ConfigField::DataBits => self.data_bits.to_string(),
            ConfigField::StopBits => self.stop_bits.to_string(),
            ConfigField::Parity => self.parity.to_string(),
            ConfigField::FlowControl => self.flow_control.to_string(),
        }
    }

    /// Select the option at `index` for `field`.
    ///
    /// Returns `false` and keeps the previous value when the index has no entry.
    pub fn set_index(&mut self, field: ConfigField, index: usize) -> bool {
        match field {
            ConfigField::BaudRate => BaudRate::from_index(index).map(|v| self.baud_rate = v),
            ConfigField::DataBits => DataBits::from_index(index).map(|v| self.data_bits = v),
            ConfigField::StopBits => StopBits::from_index(index).map(|v| self.stop_bits = v),
            ConfigField::Parity => Parity::from_index(index).map(|v| self.parity = v),
            ConfigField::FlowControl => {
                FlowControl::from_index(index).map(|v| self.flow_control = v)
            }
        }
        .is_some()
    }

    pub fn cycle(&mut self, field: ConfigField, forward: bool) {
        match field {
            ConfigField::BaudRate => self.baud_rate = self.baud_rate.cycled(forward),
            ConfigField::DataBits => self.data_bits = self.data_bits.cycled(forward),
            ConfigField::StopBits => self.stop_bits = self.stop_bits.cycled(forward),
            ConfigField::Parity => self.parity = self.parity.cycled(forward),
            ConfigField::FlowControl => self.flow_control = self.flow_control.cycled(forward),
        }
    }

    /// Check that every selected option can be expressed by the host serial driver.
    pub fn validate(&self) -> Result<(), PortError> {
        self.host_stop_bits()?;
        self.host_parity()?;
        Ok(())
    }

    fn host_data_bits(&self) -> serialport::DataBits {
        match self.data_bits {
            DataBits::Five => serialport::DataBits::Five,
            DataBits::Six => serialport::DataBits::Six,
            DataBits::Seven => serialport::DataBits::Seven,
            DataBits::Eight => serialport::DataBits::Eight,
        }
    }

    fn host_stop_bits(&self) -> Result<serialport::StopBits, PortError> {
        match self.stop_bits {
            StopBits::One => Ok(serialport::StopBits::One),
            StopBits::Two => Ok(serialport::StopBits::Two),
            StopBits::OneAndHalf => Err(PortError::UnsupportedOperation),
        }
    }

    fn host_parity(&self) -> Result<serialport::Parity, PortError> {
        match self.parity {
            Parity::None => Ok(serialport::Parity::None),
            Parity::Even => Ok(serialport::Parity::Even),
            Parity::Odd => Ok(serialport::Parity::Odd),
            Parity::Space | Parity::Mark => Err(PortError::UnsupportedOperation),
        }
    }

    fn host_flow_control(&self) -> serialport::FlowControl {
        match self.flow_control {
            FlowControl::None => serialport::FlowControl::None,
            FlowControl::Hardware => serialport::FlowControl::Hardware,
            FlowControl::Software => serialport::FlowControl::Software,
        }
    }

    pub fn apply_builder(
        &self,
        builder: serialport::SerialPortBuilder,
    ) -> Result<serialport::SerialPortBuilder, PortError> {
        Ok(builder
            .baud_rate(self.baud_rate.value())
            .data_bits(self.host_data_bits())
            .stop_bits(self.host_stop_bits()?)
            .parity(self.host_parity()?)
            .flow_control(self.host_flow_control()))
    }

    /// Push every setting onto a port that is already open.
    pub fn apply_to_port(&self, port: &mut dyn SerialPort) -> Result<(), PortError> {
        let stop_bits = self.host_stop_bits()?;
        let parity = self.host_parity()?;
        port.set_baud_rate(self.baud_rate.value())?;
        port.set_data_bits(self.host_data_bits())?;
        port.set_stop_bits(stop_bits)?;
        port.set_parity(parity)?;
        port.set_flow_control(self.host_flow_control())?;
        Ok(())
    }

    /// Compact form such as `9600 8N1`, with a flow control suffix when enabled.
    pub fn summary(&self) -> String {
        let stop = match self.stop_bits {
            StopBits::One => "1",
            StopBits::OneAndHalf => "1.5",
            StopBits::Two => "2",
        };
        let flow = match self.flow_control {
            FlowControl::None => "",
            FlowControl::Hardware => " rts/cts",
            FlowControl::Software => " xon/xoff",
        };
        format!(
            "{} {}{}{}{}",
            self.baud_rate.value(),
            self.data_bits.value(),
            self.parity.short(),
            stop,
            flow
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_initial_picker_positions() {
        let cfg = SerialConfig::default();
        assert_eq!(cfg.index_of(ConfigField::BaudRate), 3);
        assert_eq!(cfg.index_of(ConfigField::DataBits), 3);
        assert_eq!(cfg.index_of(ConfigField::StopBits), 0);
        assert_eq!(cfg.index_of(ConfigField::Parity), 0);
        assert_eq!(cfg.index_of(ConfigField::FlowControl), 0);
        assert_eq!(cfg.summary(), "9600 8N1");
    }

    #[test]
    fn option_lists_keep_their_order() {
        assert_eq!(
            BaudRate::labels(),
            vec!["1200", "2400", "4800", "9600", "19200", "38400", "57600", "115200"]
        );
        assert_eq!(
            DataBits::labels(),
            vec!["5 bits", "6 bits", "7 bits", "8 bits"]
        );
        assert_eq!(StopBits::labels(), vec!["1 bit", "1.5 bits", "2 bits"]);
        assert_eq!(
            Parity::labels(),
            vec!["no parity", "even", "odd", "space", "mark"]
        );
        assert_eq!(
            FlowControl::labels(),
            vec!["no flow control", "hardware", "software"]
        );
    }

    #[test]
    fn index_maps_to_constant() {
        assert_eq!(BaudRate::from_index(7), Some(BaudRate::B115200));
        assert_eq!(BaudRate::from_index(8), None);
        assert_eq!(Parity::from_index(4), Some(Parity::Mark));
        assert_eq!(FlowControl::from_index(1), Some(FlowControl::Hardware));
        assert_eq!(StopBits::OneAndHalf.index(), 1);
    }

    #[test]
    fn out_of_range_index_keeps_previous_value() {
        let mut cfg = SerialConfig::default();
        assert!(!cfg.set_index(ConfigField::DataBits, 9));
        assert_eq!(cfg.data_bits, DataBits::Eight);
        assert!(cfg.set_index(ConfigField::DataBits, 2));
        assert_eq!(cfg.data_bits, DataBits::Seven);
    }

    #[test]
    fn cycling_wraps_around() {
        let mut cfg = SerialConfig::default();
        cfg.cycle(ConfigField::FlowControl, false);
        assert_eq!(cfg.flow_control, FlowControl::Software);
        cfg.cycle(ConfigField::FlowControl, true);
        assert_eq!(cfg.flow_control, FlowControl::None);
        cfg.baud_rate = BaudRate::B115200;
        cfg.cycle(ConfigField::BaudRate, true);
        assert_eq!(cfg.baud_rate, BaudRate::B1200);
    }

    #[test]
    fn unsupported_settings_fail_validation() {
        let mut cfg = SerialConfig::default();
        assert!(cfg.validate().is_ok());
        cfg.stop_bits = StopBits::OneAndHalf;
        assert_eq!(cfg.validate(), Err(PortError::UnsupportedOperation));
        cfg.stop_bits = StopBits::Two;
        cfg.parity = Parity::Mark;
        assert_eq!(cfg.validate(), Err(PortError::UnsupportedOperation));
        assert!(cfg
            .apply_builder(serialport::new("/dev/null", 9600))
            .is_err());
    }

    #[test]
    fn parses_command_line_values() -> Result<()> {
        assert_eq!("115200".parse::<BaudRate>()?, BaudRate::B115200);
        assert!("115201".parse::<BaudRate>().is_err());
        assert_eq!("7".parse::<DataBits>()?, DataBits::Seven);
        assert_eq!("8 bits".parse::<DataBits>()?, DataBits::Eight);
        assert_eq!("1.5".parse::<StopBits>()?, StopBits::OneAndHalf);
        assert_eq!("2 bits".parse::<StopBits>()?, StopBits::Two);
        assert_eq!("EVEN".parse::<Parity>()?, Parity::Even);
        assert_eq!("xonxoff".parse::<FlowControl>()?, FlowControl::Software);
        Ok(())
    }

    #[test]
    fn summary_mentions_flow_control() {
        let cfg = SerialConfig {
            baud_rate: BaudRate::B115200,
            data_bits: DataBits::Seven,
            stop_bits: StopBits::Two,
            parity: Parity::Even,
            flow_control: FlowControl::Hardware,
        };
        assert_eq!(cfg.summary(), "115200 7E2 rts/cts");
    }
}
