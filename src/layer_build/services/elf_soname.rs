//! Minimal ELF reader for the `DT_SONAME` of a shared object.

const ELF_MAGIC: &[u8; 4] = b"\x7fELF";
const CLASS_32: u8 = 1;
const CLASS_64: u8 = 2;
const DATA_LITTLE_ENDIAN: u8 = 1;
const DATA_BIG_ENDIAN: u8 = 2;

const SHT_DYNAMIC: u32 = 6;
const DT_NULL: u64 = 0;
const DT_SONAME: u64 = 14;

struct ElfReader<'a> {
    data: &'a [u8],
    is_64: bool,
    little_endian: bool,
}

struct SectionHeader {
    sh_type: u32,
    offset: usize,
    size: usize,
    link: usize,
}

impl<'a> ElfReader<'a> {
    fn new(data: &'a [u8]) -> Option<Self> {
        if data.len() < 16 || &data[..4] != ELF_MAGIC {
            return None;
        }
        let is_64 = match data[4] {
            CLASS_32 => false,
            CLASS_64 => true,
            _ => return None,
        };
        let little_endian = match data[5] {
            DATA_LITTLE_ENDIAN => true,
            DATA_BIG_ENDIAN => false,
            _ => return None,
        };
        Some(Self {
            data,
            is_64,
            little_endian,
        })
    }

    fn bytes<const N: usize>(&self, offset: usize) -> Option<[u8; N]> {
        let end = offset.checked_add(N)?;
        self.data.get(offset..end)?.try_into().ok()
    }

    fn u16_at(&self, offset: usize) -> Option<u64> {
        let bytes = self.bytes::<2>(offset)?;
        Some(u64::from(if self.little_endian {
            u16::from_le_bytes(bytes)
        } else {
            u16::from_be_bytes(bytes)
        }))
    }

    fn u32_at(&self, offset: usize) -> Option<u64> {
        let bytes = self.bytes::<4>(offset)?;
        Some(u64::from(if self.little_endian {
            u32::from_le_bytes(bytes)
        } else {
            u32::from_be_bytes(bytes)
        }))
    }

    fn u64_at(&self, offset: usize) -> Option<u64> {
        let bytes = self.bytes::<8>(offset)?;
        Some(if self.little_endian {
            u64::from_le_bytes(bytes)
        } else {
            u64::from_be_bytes(bytes)
        })
    }

    /// Address-sized field
    fn word_at(&self, offset: usize) -> Option<u64> {
        if self.is_64 {
            self.u64_at(offset)
        } else {
            self.u32_at(offset)
        }
    }

    fn section_headers(&self) -> Option<Vec<SectionHeader>> {
        let (shoff, shentsize, shnum) = if self.is_64 {
            (self.u64_at(0x28)?, self.u16_at(0x3A)?, self.u16_at(0x3C)?)
        } else {
            (self.u32_at(0x20)?, self.u16_at(0x2E)?, self.u16_at(0x30)?)
        };
        let shoff = usize::try_from(shoff).ok()?;
        let shentsize = usize::try_from(shentsize).ok()?;

        (0..usize::try_from(shnum).ok()?)
            .map(|index| {
                let base = shoff.checked_add(index.checked_mul(shentsize)?)?;
                let (offset, size, link) = if self.is_64 { (24, 32, 40) } else { (16, 20, 24) };
                let offset = base.checked_add(offset)?;
                let size = base.checked_add(size)?;
                let link = base.checked_add(link)?;
                Some(SectionHeader {
                    sh_type: u32::try_from(self.u32_at(base.checked_add(4)?)?).ok()?,
                    offset: usize::try_from(self.word_at(offset)?).ok()?,
                    size: usize::try_from(self.word_at(size)?).ok()?,
                    link: usize::try_from(self.u32_at(link)?).ok()?,
                })
            })
            .collect()
    }

    fn c_string(&self, offset: usize) -> Option<String> {
        let rest = self.data.get(offset..)?;
        let end = rest.iter().position(|&b| b == 0)?;
        String::from_utf8(rest[..end].to_vec()).ok()
    }

    fn soname(&self) -> Option<String> {
        let sections = self.section_headers()?;
        let dynamic = sections.iter().find(|s| s.sh_type == SHT_DYNAMIC)?;
        let strtab = sections.get(dynamic.link)?;
        let entry_size = if self.is_64 { 16 } else { 8 };
        let word_size = entry_size / 2;

        let mut offset = dynamic.offset;
        let end = dynamic.offset.checked_add(dynamic.size)?;
        while offset.checked_add(entry_size)? <= end {
            let tag = self.word_at(offset)?;
            let value = self.word_at(offset.checked_add(word_size)?)?;
            match tag {
                DT_NULL => return None,
                DT_SONAME => {
                    let name_offset = strtab.offset.checked_add(usize::try_from(value).ok()?)?;
                    return self.c_string(name_offset);
                }
                _ => offset += entry_size,
            }
        }
        None
    }
}

/// `DT_SONAME` of an ELF shared object
///
/// Returns `None` for anything that is not a well-formed ELF file with a
/// dynamic section naming a soname.
pub fn elf_soname(data: &[u8]) -> Option<String> {
    ElfReader::new(data)?.soname()
}
