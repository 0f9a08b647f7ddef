//! Parsing of response texts.
//!
//! Responses are comma-separated lists of positional values and
//! `KEY=value` fields, e.g. `SP,NR=13,NAME=Betriebsart,VAL=1,MAX=7,MIN=0`.
//! All functions return [`None`] if the response doesn't match.

/// Returns the value of the last `KEY=value` field with the given key.
pub fn field<'a>(resp: &'a str, key: &str) -> Option<&'a str> {
    resp.split(',').rev().find_map(|part| {
        part.trim_start()
            .strip_prefix(key)?
            .strip_prefix('=')
            .map(str::trim)
            .filter(|val| !val.is_empty())
    })
}

fn number<T: core::str::FromStr>(s: &str) -> Option<T> {
    s.bytes()
        .all(|b| b.is_ascii_digit())
        .then(|| s.parse().ok())
        .flatten()
}

fn number_field<T: core::str::FromStr>(resp: &str, key: &str) -> Option<T> {
    number(field(resp, key)?)
}

/// Parses `SUM=<n>`.
pub fn sum(resp: &str) -> Option<u32> {
    number(resp.strip_prefix("SUM=")?)
}

/// Parses `RID,<serial number>`.
pub fn serial_number(resp: &str) -> Option<u32> {
    number(resp.strip_prefix("RID,")?)
}

/// Parses the version response `SP,NR=9,...,NAME=<version>,...,VAL=<revision>,...`.
pub fn version(resp: &str) -> Option<(&str, &str)> {
    if !resp.starts_with("SP,NR=9,") {
        return None;
    }

    Some((field(resp, "NAME")?, field(resp, "VAL")?))
}

/// Fields of a parameter response.
#[derive(PartialEq, Eq, Debug)]
pub struct ParamFields<'a> {
    pub name: &'a str,
    pub value: &'a str,
    pub max: &'a str,
    pub min: &'a str,
}

/// Parses the response to a parameter request or update.
///
/// The response has to start with the command of the parameter, e.g. `SP,NR=13`.
pub fn param<'a>(resp: &'a str, cmd: &str) -> Option<ParamFields<'a>> {
    if !resp.strip_prefix(cmd)?.starts_with(',') {
        return None;
    }

    Some(ParamFields {
        name: field(resp, "NAME")?,
        value: field(resp, "VAL")?,
        max: field(resp, "MAX")?,
        min: field(resp, "MIN")?,
    })
}

/// Parses a fast query answer `MA,<number>,<value>,<unknown>`.
pub fn data_point(resp: &str) -> Option<(u16, &str)> {
    let mut parts = resp.strip_prefix("MA,")?.split(',');
    let (nr, val, _) = (parts.next()?, parts.next()?, number::<u32>(parts.next()?)?);

    if parts.next().is_some() || val.is_empty() {
        return None;
    }

    Some((number(nr)?, val))
}

/// Fields of a fault list entry.
#[derive(PartialEq, Eq, Debug)]
pub struct FaultFields<'a> {
    pub index: u32,
    pub error: u32,
    pub date: &'a str,
    pub time: &'a str,
    pub message: &'a str,
}

/// Parses a fault list entry `AA,<index>,<error>,DD.MM.YY-HH:MM:SS,<message>`.
pub fn fault(resp: &str) -> Option<FaultFields<'_>> {
    let mut parts = resp.strip_prefix("AA,")?.splitn(4, ',');
    let index = number(parts.next()?)?;
    let error = number(parts.next()?)?;
    let (date, time) = parts.next()?.split_once('-')?;

    Some(FaultFields {
        index,
        error,
        date,
        time,
        message: parts.next()?,
    })
}

/// Parses the clock response `CLK,DA=DD.MM.YY,TI=HH:MM:SS,WD=<weekday>`.
pub fn clock(resp: &str) -> Option<(&str, &str, u8)> {
    if !resp.starts_with("CLK") {
        return None;
    }

    Some((field(resp, "DA")?, field(resp, "TI")?, number_field(resp, "WD")?))
}

/// Fields of a time program header.
#[derive(PartialEq, Eq, Debug)]
pub struct ProgramFields<'a> {
    pub name: &'a str,
    pub entries_a_day: u8,
    pub number_of_states: u8,
    pub step_size: u8,
    pub number_of_days: u8,
}

/// Parses the time program header `PRI<index>,NAME=..,EAD=..,NOS=..,STE=..,NOD=..`.
pub fn program(resp: &str, index: u8) -> Option<ProgramFields<'_>> {
    let rest = resp.strip_prefix("PRI")?;
    let (idx, _) = rest.split_once(',')?;

    if number::<u8>(idx)? != index {
        return None;
    }

    Some(ProgramFields {
        name: field(resp, "NAME")?,
        entries_a_day: number_field(resp, "EAD")?,
        number_of_states: number_field(resp, "NOS")?,
        step_size: number_field(resp, "STE")?,
        number_of_days: number_field(resp, "NOD")?,
    })
}

/// Fields of a time program entry.
#[derive(PartialEq, Eq, Debug)]
pub struct EntryFields<'a> {
    pub state: u8,
    pub begin: &'a str,
    pub end: &'a str,
}

/// Parses the time program entry `PRE,PR=<index>,DAY=<day>,EV=<num>,ST=..,BEG=..,END=..`.
///
/// Index, day and entry number have to match the requested ones.
pub fn entry(resp: &str, index: u8, day: usize, num: usize) -> Option<EntryFields<'_>> {
    if !resp.starts_with("PRE,") {
        return None;
    }

    if number_field::<u8>(resp, "PR")? != index
        || number_field::<usize>(resp, "DAY")? != day
        || number_field::<usize>(resp, "EV")? != num
    {
        return None;
    }

    Some(EntryFields {
        state: number_field(resp, "ST")?,
        begin: field(resp, "BEG")?,
        end: field(resp, "END")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields() {
        let resp = "SP,NR=69,ID=69,NAME=HKR Soll_Raum,LV=0,MA=30.0,MI=10.0,VAL=21.5,MAX=25.0,MIN=10.0";

        assert_eq!(field(resp, "NAME"), Some("HKR Soll_Raum"));
        assert_eq!(field(resp, "MA"), Some("30.0"), "key should match exactly");
        assert_eq!(field(resp, "MAX"), Some("25.0"));
        assert_eq!(field(resp, "FOO"), None);
        assert_eq!(field("A=1,A=2", "A"), Some("2"), "last field should win");
        assert_eq!(field("A=", "A"), None, "empty value shouldn't match");
    }

    #[test]
    fn parse_param() {
        let resp = "SP,NR=13,ID=13,NAME=Betriebsart,LV=0,MA=7,MI=0,VAL=1,MAX=7,MIN=0";

        assert_eq!(
            param(resp, "SP,NR=13"),
            Some(ParamFields {
                name: "Betriebsart",
                value: "1",
                max: "7",
                min: "0"
            })
        );
        assert_eq!(param(resp, "SP,NR=1"), None, "prefix should match the whole command");
        assert_eq!(param("SP,NR=13,NAME=Betriebsart,VAL=1", "SP,NR=13"), None);
    }

    #[test]
    fn parse_data_point() {
        assert_eq!(data_point("MA,0,-3.4,17"), Some((0, "-3.4")));
        assert_eq!(data_point("MA,37,328,3"), Some((37, "328")));
        assert_eq!(data_point("MA,0,-3.4"), None);
        assert_eq!(data_point("MA,0,-3.4,17,1"), None);
        assert_eq!(data_point("MA,x,-3.4,17"), None);
    }

    #[test]
    fn parse_fault() {
        assert_eq!(
            fault("AA,29,20,14.09.14-11:52:08,EQ_Spreizung"),
            Some(FaultFields {
                index: 29,
                error: 20,
                date: "14.09.14",
                time: "11:52:08",
                message: "EQ_Spreizung"
            })
        );
        assert_eq!(
            fault("AA,1,65534,15.11.15-01:02:03,Message, with comma").map(|f| f.message),
            Some("Message, with comma"),
            "message may contain commas"
        );
        assert_eq!(fault("AA,1,2,15.11.15 01:02:03,X"), None);
    }

    #[test]
    fn parse_misc() {
        assert_eq!(sum("SUM=2757"), Some(2757));
        assert_eq!(sum("SUM=-1"), None);
        assert_eq!(serial_number("RID,123456"), Some(123_456));
        assert_eq!(serial_number("RID,12a"), None);
        assert_eq!(
            version("SP,NR=9,ID=9,NAME=3.0.20,LV=0,MA=0,MI=0,VAL=2321,MAX=0,MIN=0"),
            Some(("3.0.20", "2321"))
        );
        assert_eq!(
            clock("CLK,DA=26.11.15,TI=21:28:57,WD=4"),
            Some(("26.11.15", "21:28:57", 4))
        );
    }

    #[test]
    fn parse_program() {
        let resp = "PRI0,NAME=Warmwasser,EAD=7,NOS=2,STE=15,NOD=7,ACS=0,US=1";

        assert_eq!(
            program(resp, 0),
            Some(ProgramFields {
                name: "Warmwasser",
                entries_a_day: 7,
                number_of_states: 2,
                step_size: 15,
                number_of_days: 7
            })
        );
        assert_eq!(program(resp, 1), None, "index should match");
    }

    #[test]
    fn parse_entry() {
        let resp = "PRE,PR=0,DAY=2,EV=1,ST=1,BEG=03:30,END=22:00";

        assert_eq!(
            entry(resp, 0, 2, 1),
            Some(EntryFields {
                state: 1,
                begin: "03:30",
                end: "22:00"
            })
        );
        assert_eq!(entry(resp, 0, 2, 0), None, "entry number should match");
        assert_eq!(entry(resp, 1, 2, 1), None, "index should match");
    }
}
