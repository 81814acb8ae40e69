use crate::{io, options::Sections};
use anyhow::Result;
use log::info;

impl Sections {
    pub fn run(&self) -> Result<()> {
        let centerline = io::read_centerline(&self.centerline)?;
        let sections = centerline.cross_sections(self.section.spacing, self.section.half_length)?;
        info!(
            "{} cross-sections along {:.2} units of centerline",
            sections.len(),
            centerline.length()
        );
        io::write(self.out.as_deref(), &io::sections_collection(&sections))
    }
}
